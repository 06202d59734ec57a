use crate::{
    block::BlockHeader,
    config::{RETARGET_INTERVAL, SPENDABLE_COINBASE_DEPTH, TARGET_TIMESPAN},
    crypto::Hash,
    difficulty::{check_proof_of_work, compact_to_target},
    network::Network,
};
use log::debug;
use primitive_types::U256;
use std::sync::OnceLock;

use super::{check_genesis, Checkpoints};

// Merkle root of the launch coinbase, shared by every network
const GENESIS_MERKLE_ROOT: Hash = Hash::new([
    0x9d, 0xa7, 0x28, 0x24, 0x42, 0x49, 0xd0, 0xdf,
    0xcd, 0xc7, 0x68, 0x51, 0x07, 0xa6, 0x19, 0x43,
    0x72, 0x9c, 0x0d, 0xa5, 0xdb, 0xdb, 0x6f, 0x7c,
    0xdc, 0x86, 0x1a, 0x3f, 0xb0, 0x2b, 0xf3, 0x5b,
]);

// Genesis headers per network. It must hash to the constant below;
// the check runs once when the parameters are built.
const MAINNET_GENESIS: BlockHeader =
    BlockHeader::new(1, Hash::zero(), GENESIS_MERKLE_ROOT, 1417219200, 0x1e0fffff, 833226);
const TESTNET_GENESIS: BlockHeader =
    BlockHeader::new(1, Hash::zero(), GENESIS_MERKLE_ROOT, 1417248000, 0x1e0fffff, 2250490);
const REGTEST_GENESIS: BlockHeader =
    BlockHeader::new(1, Hash::zero(), GENESIS_MERKLE_ROOT, 1417219200, 0x207fffff, 1);

const MAINNET_GENESIS_HASH: Hash = Hash::new([
    0x00, 0x00, 0x06, 0xc2, 0xc9, 0x21, 0x37, 0xeb,
    0x17, 0x34, 0xdf, 0xa4, 0x93, 0xbe, 0xff, 0x12,
    0x32, 0x45, 0x74, 0xa9, 0xa5, 0xf0, 0x85, 0xd7,
    0x3e, 0x26, 0x9e, 0xe7, 0xcd, 0x06, 0xe6, 0x01,
]);
const TESTNET_GENESIS_HASH: Hash = Hash::new([
    0x00, 0x00, 0x0b, 0xf8, 0x48, 0x47, 0x2d, 0x07,
    0x70, 0xb4, 0x1f, 0xcc, 0xb9, 0xa3, 0x24, 0x89,
    0x2d, 0xe9, 0xec, 0xf4, 0x60, 0x51, 0xe1, 0x58,
    0xb0, 0x91, 0x3d, 0x41, 0x44, 0xbb, 0x36, 0x36,
]);
const REGTEST_GENESIS_HASH: Hash = Hash::new([
    0x26, 0x03, 0xdb, 0x5c, 0x2f, 0x5f, 0xa2, 0x75,
    0xce, 0xf7, 0xdc, 0xfc, 0x40, 0xe1, 0xdc, 0xc7,
    0x33, 0x7d, 0xb0, 0x7a, 0x5a, 0x20, 0xf4, 0xee,
    0x21, 0xcb, 0x28, 0x41, 0xf1, 0x37, 0x92, 0x71,
]);

// Historical mainnet checkpoints, ascending by height
const MAINNET_CHECKPOINTS: &[(u64, &str)] = &[
    (276, "0000000000000073a6b02412fc261414fde6304366ca7d90cc0c175516d52272"),
    (6888, "00000000000000077ae1fcd6f73b21cb62e1410db57f4a5decb2728cdfc2df84"),
    (7880, "0000000000001017d14badb06d831f101d94c823715113b7b6b11b7649250ce6"),
    (8047, "94e1cf0e8ced93a0f4b34d4845493d07b7c2fb1b92d1e9d2681464bdc2547728"),
    (8048, "0a909aca8cf1c12b412d286c88f1e41ceab5336a231772b8da05022c5f4c544c"),
    (8049, "28a3efae5e2295ff571943e6b7906f4ac0e7b9c17cad90715d13de2613a71b29"),
    (8050, "56e81e95c989a4c18151c19a0e53d3cbc39314f933eea6f16e0eaa1b2529d027"),
    (8051, "dc26f8766497644ba86ff8bb8bb13b8be3912299af1046f0e9e0488b393172d0"),
    (8052, "0fc44b803dc4d8572980e3c3437bc9b8f0a00d2583ad8792ac76fcd1299793af"),
    (8053, "b543bb95ad48dbc1bcf76c100ab5f7fcdc68b4f57e15bfcad6091680446c51bc"),
    (8054, "e40395afad71babe79627563f0f1401ca1f4d082eebc6e7576d7fe8445ac7606"),
    (8055, "24046864d432565d46481b469611d0f97b9ac0fd3dff0a8f71fb7d8e3a983994"),
    (50000, "41f755dea72e670055b705f50bdb0ab790dd9c4aff2c9b7b79faffdd7a73843c"),
    (50001, "47fabbdfaf07959435ef810cdd8df7f7a27ca47b9dee6a55e441ce07eddd9ffe"),
    (50002, "ba831699caae7b8ba109db7aa0a3d78fdd6242b2033ba275e6c1a7bde182b1b5"),
    (50003, "ed192804d7f7ff66ec9ac25f51e8663a81dfbeec135d8f9bdbeb583316fa67b1"),
    (50004, "f08445ee30d51cb872bd09c9a1cf89a31a3a100cfa8ac0965c324696b204cca7"),
    (50005, "f9134f2047e4aa45aa2735443d23bf872d6b4c9cc8177602dfa1eab8f6aadb78"),
    (50006, "4724c3034aa1bc54d1f4e383b17e5d3a9dd4764f455fddfa7ba54fb86a468440"),
    (50007, "45612abb33f82c02f1b2eced3784f17f300ce988c3cf87dd34266f62a7b80934"),
    (50008, "18ceab3202f1f7e1208fc8241de41c47265dc5f5b0599130b06a26da9139e3d6"),
    (52500, "5241240023621728f1db66ea054d43dc019a721199b928b7b1dd6864bc161ea2"),
    (55002, "c097ca76d17aaaa627a2232d27fbd1c818fd26591a0a913031e3e69490b1bdf4"),
    (57500, "e279228f63471dbee3b4412e13934926a2e25e0995b3ec212a0608907da6a97d"),
    (60000, "417ed8dee6e991aa46bbd395f95a1d39f9e501d74c93d46be422725659929f74"),
    (62500, "1244aca23d2c49340faab580cc0f02db0fe59f8034a09b35e8f07151c26a3c94"),
    (65000, "bee8277e4f19a5544d1803caf657e5653abbbaea09dc212ec864c4a4a3672a7e"),
    (67500, "4396e62e9e37f6c204888b92dee34718b45500e56f69d2c539c433bbf4058ed5"),
    (70000, "cd11d1a944de0760ad4fd0ccdb76001b1afdda90a8bc3f2026c7ff2c1cab0a56"),
    (72500, "ab17834d97c22e100f3e79f6fd617d616247330b3b515984517f3a762d8b8a05"),
    (75000, "61cefd4b5f190250292f1d61747ff2fc990084f9874dbea09c11cdac9463e0b3"),
    (77500, "97a87ba804a824a1ce4a198319fd1d12ba375ad64cb3f2c9b1395c8a6766cdd2"),
    (80000, "de942516cb95331ec8090ecc211aa78ab5e78baaf34df2d2e94219fa3e8abef6"),
    (82500, "0ede1320d4d054b61e2edce28dd9944136a63b6e8c1ad865bee75f605c738d62"),
    (85000, "225e5c2910f22b322f30f4c79e3c0a7dfa17c89b6d7a656982474fbf7cba2c99"),
    (87500, "ad8752cccfab86c7e04385c669c5fa835505ec33786aba4e94210354ca52551d"),
    (90000, "de8abf266c7b734bf734e27e61d613a4807077e64617acb3fdc5cd17257eaf4e"),
    (92500, "411d07045281cfacb06f42e27cf1e9e74fe2acfd071fc274d1ac4b7c55d8193d"),
    (95000, "05764957f120b162e870de399fd8a0674c88337d3eda0851cce3cb53a8c716c8"),
    (100000, "3e57c57d272ceae1285c40cbb741bc7087915c00fbb5a572da3f6c5a3dbcc17c"),
    (150000, "a555e059996273d721ccae4d6520b502cc26840244e529f2adf8404581971f71"),
    (200000, "1b395fd2bd19f5d89fbabc9a98224fcfff94dc531805a1dba0ec02358ee3ba31"),
    (210000, "7252634dc1c8d06b8f41dbfb577273e08171db3ecdb26dc09c239daba8ee180f"),
];

// DNS hosts answering with lists of reachable peers
const MAINNET_DNS_SEEDS: [&str; 2] = ["dnsseed.pecunia.network", "dnsseed.pecunia.dev"];
const TESTNET_DNS_SEEDS: [&str; 1] = ["dnsseed-testnet.pecunia.network"];

// Mainnet seed nodes
const MAINNET_SEED_NODES: [&str; 7] = [
    "104.154.78.28:8998",
    "104.236.102.232:8998",
    "104.236.63.64:8998",
    "104.238.180.131:8998",
    "104.45.25.237:8998",
    "105.237.225.102:8998",
    "107.191.62.193:8998",
];

// Testnet seed nodes
const TESTNET_SEED_NODES: [&str; 1] = ["157.7.65.157:18998"];

// Everything every node on one network must agree on: difficulty rules,
// genesis block, address versions, wire magic and trusted checkpoints.
#[derive(Debug)]
pub struct ChainParams {
    network: Network,
    retarget_interval: u32,
    target_timespan: u64,
    max_target: U256,
    max_target_bits: u32,
    genesis: BlockHeader,
    genesis_hash: Hash,
    address_version: u8,
    p2sh_version: u8,
    private_key_version: u8,
    magic: u32,
    default_port: u16,
    spendable_coinbase_depth: u32,
    checkpoints: Checkpoints,
    dns_seeds: &'static [&'static str],
    seed_nodes: &'static [&'static str],
}

impl ChainParams {
    // Process-wide parameters for the given network, built once on first
    // access and reused afterwards. Safe under concurrent first access.
    pub fn get(network: Network) -> &'static Self {
        static MAINNET: OnceLock<ChainParams> = OnceLock::new();
        static TESTNET: OnceLock<ChainParams> = OnceLock::new();
        static REGTEST: OnceLock<ChainParams> = OnceLock::new();

        let cell = match network {
            Network::Mainnet => &MAINNET,
            Network::Testnet => &TESTNET,
            Network::Regtest => &REGTEST,
        };
        cell.get_or_init(|| Self::build(network))
    }

    fn build(network: Network) -> Self {
        let (genesis, genesis_hash, max_target_bits) = match network {
            Network::Mainnet => (MAINNET_GENESIS, MAINNET_GENESIS_HASH, 0x200fffff),
            Network::Testnet => (TESTNET_GENESIS, TESTNET_GENESIS_HASH, 0x200fffff),
            Network::Regtest => (REGTEST_GENESIS, REGTEST_GENESIS_HASH, 0x207fffff),
        };
        let (address_version, p2sh_version, private_key_version) = match network {
            Network::Mainnet => (55, 117, 183),
            Network::Testnet | Network::Regtest => (111, 196, 239),
        };
        let (magic, default_port) = match network {
            Network::Mainnet => (0xaaaaaaaa, 8998),
            Network::Testnet => (0xbbbbbbbb, 18998),
            Network::Regtest => (0xdddddddd, 28998),
        };

        let params = Self {
            network,
            retarget_interval: RETARGET_INTERVAL,
            target_timespan: TARGET_TIMESPAN,
            max_target: compact_to_target(max_target_bits)
                .expect("invalid maximum target encoding"),
            max_target_bits,
            genesis,
            genesis_hash,
            address_version,
            p2sh_version,
            private_key_version,
            magic,
            default_port,
            spendable_coinbase_depth: SPENDABLE_COINBASE_DEPTH,
            checkpoints: match network {
                Network::Mainnet => Checkpoints::from_table(MAINNET_CHECKPOINTS),
                Network::Testnet | Network::Regtest => Checkpoints::from_table(&[]),
            },
            dns_seeds: match network {
                Network::Mainnet => &MAINNET_DNS_SEEDS,
                Network::Testnet => &TESTNET_DNS_SEEDS,
                Network::Regtest => &[],
            },
            seed_nodes: match network {
                Network::Mainnet => &MAINNET_SEED_NODES,
                Network::Testnet => &TESTNET_SEED_NODES,
                Network::Regtest => &[],
            },
        };

        // A corrupted parameter table must never reach chain validation
        if let Err(e) = check_genesis(&params.genesis, &params.genesis_hash) {
            panic!("{} genesis verification failed: {}", network, e);
        }
        let valid = check_proof_of_work(&params.genesis_hash, params.genesis.bits, &params.max_target)
            .expect("invalid genesis difficulty encoding");
        assert!(
            valid,
            "{} genesis does not satisfy its own difficulty target",
            network
        );

        debug!(
            "{} chain parameters initialized, genesis {}",
            network, params.genesis_hash
        );
        params
    }

    pub fn network(&self) -> Network {
        self.network
    }

    // Blocks between two difficulty retargets
    pub fn retarget_interval(&self) -> u32 {
        self.retarget_interval
    }

    // Expected duration of one retarget window, in seconds
    pub fn target_timespan(&self) -> u64 {
        self.target_timespan
    }

    // Loosest proof-of-work target any block may claim
    pub fn max_target(&self) -> &U256 {
        &self.max_target
    }

    pub fn max_target_bits(&self) -> u32 {
        self.max_target_bits
    }

    pub fn genesis(&self) -> &BlockHeader {
        &self.genesis
    }

    pub fn genesis_hash(&self) -> &Hash {
        &self.genesis_hash
    }

    // Version byte of standard pay-to-pubkey-hash addresses
    pub fn address_version(&self) -> u8 {
        self.address_version
    }

    // Version byte of pay-to-script-hash addresses
    pub fn p2sh_version(&self) -> u8 {
        self.p2sh_version
    }

    // Version byte of exported private keys
    pub fn private_key_version(&self) -> u8 {
        self.private_key_version
    }

    // The address versions a decoder may accept for this network
    pub fn acceptable_address_versions(&self) -> [u8; 2] {
        [self.address_version, self.p2sh_version]
    }

    // First bytes of every wire message
    pub fn magic(&self) -> u32 {
        self.magic
    }

    pub fn default_port(&self) -> u16 {
        self.default_port
    }

    // Depth a coinbase output must be buried under before it is spendable
    pub fn spendable_coinbase_depth(&self) -> u32 {
        self.spendable_coinbase_depth
    }

    pub fn checkpoints(&self) -> &Checkpoints {
        &self.checkpoints
    }

    pub fn dns_seeds(&self) -> &'static [&'static str] {
        self.dns_seeds
    }

    pub fn seed_nodes(&self) -> &'static [&'static str] {
        self.seed_nodes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_instance_on_every_access() {
        let first = ChainParams::get(Network::Mainnet);
        let second = ChainParams::get(Network::Mainnet);
        assert!(std::ptr::eq(first, second));

        let testnet = ChainParams::get(Network::Testnet);
        assert!(!std::ptr::eq(first, testnet));
    }

    #[test]
    fn test_mainnet_constants() {
        let params = ChainParams::get(Network::Mainnet);
        assert_eq!(params.network(), Network::Mainnet);
        assert_eq!(params.retarget_interval(), 2016);
        assert_eq!(params.magic(), 0xaaaaaaaa);
        assert_eq!(params.default_port(), 8998);
        assert_eq!(params.acceptable_address_versions(), [55, 117]);
        assert_eq!(params.private_key_version(), 183);
        assert_eq!(params.checkpoints().len(), 43);
        assert_eq!(params.checkpoints().highest(), Some(210000));
        assert!(!params.dns_seeds().is_empty());
        assert!(!params.seed_nodes().is_empty());
    }

    #[test]
    fn test_networks_do_not_share_genesis() {
        let mainnet = ChainParams::get(Network::Mainnet);
        let testnet = ChainParams::get(Network::Testnet);
        let regtest = ChainParams::get(Network::Regtest);
        assert_ne!(mainnet.genesis_hash(), testnet.genesis_hash());
        assert_ne!(mainnet.genesis_hash(), regtest.genesis_hash());
        assert_ne!(testnet.genesis_hash(), regtest.genesis_hash());
    }

    #[test]
    fn test_max_target_decodes_from_compact_form() {
        let params = ChainParams::get(Network::Mainnet);
        assert_eq!(
            *params.max_target(),
            compact_to_target(params.max_target_bits()).unwrap()
        );
        // regtest allows near-trivial work
        let regtest = ChainParams::get(Network::Regtest);
        assert!(regtest.max_target() > params.max_target());
    }

    #[test]
    fn test_only_mainnet_carries_checkpoints() {
        assert!(ChainParams::get(Network::Testnet).checkpoints().is_empty());
        assert!(ChainParams::get(Network::Regtest).checkpoints().is_empty());
    }
}
