use std::net::Ipv4Addr;

use lpm_trie::*;

use ipnet::Ipv4Net;
use rand::prelude::*;

fn main() {
    env_logger::init();

    let mut trie = LpmTrie::<Ipv4Net>::new();
    let mut rng = thread_rng();
    let mut matched = 0usize;

    for _ in 0..1_000_000 {
        let prefix = Ipv4Net::new(Ipv4Addr::new(rng.gen(), rng.gen(), 0, 0), rng.gen_range(1..=16))
            .unwrap()
            .trunc();

        if rng.gen_bool(0.6) {
            trie.insert(prefix);
        } else if rng.gen_bool(0.5) {
            trie.remove(&prefix);
        } else {
            let host = Ipv4Net::new(Ipv4Addr::from(rng.gen::<u32>()), 32).unwrap();
            matched += trie.longest_prefix_match(&host).len();
        }
    }

    println!("{} prefixes stored, {matched} matches found", trie.count());
}
