use std::collections::hash_map::RandomState;

use clap::Parser;
use clap::ValueEnum;
use probe_map::BuildHasherStrategy;
use probe_map::HashMap;
use probe_map::HashStrategy;

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Strategy {
    /// FNV-1a over the key's bytes
    Fnv,
    /// std's SipHash-1-3 with a random seed
    Std,
}

#[derive(Parser, Debug)]
struct Args {
    #[arg(short = 'c', long = "target_capacity", default_value_t = 1000)]
    target_capacity: usize,

    #[arg(short = 'n', long = "entries")]
    entries: Option<usize>,

    #[arg(short = 's', long = "strategy", value_enum, default_value_t = Strategy::Fnv)]
    strategy: Strategy,

    /// Use "key_<n>" strings instead of integers
    #[arg(long = "string_keys")]
    string_keys: bool,
}

fn fill<K, S>(mut map: HashMap<K, u64, S>, keys: impl Iterator<Item = K>) -> HashMap<K, u64, S>
where
    S: HashStrategy<K>,
{
    let initial_capacity = map.capacity();
    let mut growths = 0;
    for (index, key) in keys.enumerate() {
        let before = map.capacity();
        map.insert(key, index as u64);
        if map.capacity() != before {
            growths += 1;
        }
    }

    println!(
        "Inserted {} entries; capacity {} -> {} over {} growth(s)",
        map.len(),
        initial_capacity,
        map.capacity(),
        growths
    );
    map
}

fn report<K, S>(map: &HashMap<K, u64, S>)
where
    S: HashStrategy<K>,
{
    println!(
        "Final load factor: {:.2}% (full: {})",
        (map.len() as f64 / map.capacity() as f64) * 100.0,
        map.is_full()
    );

    println!("Probe distance histogram:");
    let histogram = map.probe_histogram();
    let peak = histogram.iter().copied().max().unwrap_or(0).max(1);
    for (distance, count) in histogram.iter().enumerate() {
        let bar = "#".repeat(count * 50 / peak);
        println!("{distance:>3}: {count:>9} {bar}");
    }

    map.debug_stats().print();
}

fn main() {
    let args = Args::parse();
    let entries = args.entries.unwrap_or(args.target_capacity);

    println!(
        "Creating HashMap with target capacity {} ({:?} strategy)",
        args.target_capacity, args.strategy
    );

    match (args.strategy, args.string_keys) {
        (Strategy::Fnv, false) => {
            let map = HashMap::with_capacity(args.target_capacity);
            report(&fill(map, 0..entries as u64));
        }
        (Strategy::Fnv, true) => {
            let map = HashMap::with_capacity(args.target_capacity);
            report(&fill(map, (0..entries).map(|i| format!("key_{i}"))));
        }
        (Strategy::Std, false) => {
            let map = HashMap::with_capacity_and_strategy(
                args.target_capacity,
                BuildHasherStrategy(RandomState::new()),
            );
            report(&fill(map, 0..entries as u64));
        }
        (Strategy::Std, true) => {
            let map = HashMap::with_capacity_and_strategy(
                args.target_capacity,
                BuildHasherStrategy(RandomState::new()),
            );
            report(&fill(map, (0..entries).map(|i| format!("key_{i}"))));
        }
    }
}
