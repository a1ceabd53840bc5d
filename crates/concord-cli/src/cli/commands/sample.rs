use concord_core::{sample, SampleConfig};

use crate::cli::args::SampleArgs;
use crate::exit_codes::{CONFIG_ERROR, OK};

pub fn run(args: SampleArgs) -> anyhow::Result<i32> {
    let cfg = SampleConfig {
        per_category: args.per_category,
        seed: args.seed,
        ..SampleConfig::default()
    };

    let artifacts = match sample::run(&args.input, &args.output, &args.name, &cfg) {
        Ok(artifacts) => artifacts,
        Err(e) => {
            eprintln!("error: {e}");
            return Ok(CONFIG_ERROR);
        }
    };

    println!("Sampled {} items", artifacts.stats.n_items);
    for (category, count) in &artifacts.stats.per_category {
        println!("  {category}: {count}");
    }
    println!("Coding file (give to coders): {}", artifacts.coding_path.display());
    println!("Validation key (keep hidden): {}", artifacts.key_path.display());
    println!("Statistics: {}", artifacts.stats_path.display());
    Ok(OK)
}
