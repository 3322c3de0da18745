// main.rs - CLI entry point

use microhap::cli::Config;
use microhap::prelude::*;
use std::path::Path;
use std::time::Instant;

fn main() {
    if let Err(e) = run_main() {
        eprintln!("❌ ERROR: {}", e);
        std::process::exit(1);
    }
}

fn run_main() -> Result<(), String> {
    let mut args: Args = argh::from_env();
    let command_line = std::env::args().collect::<Vec<String>>().join(" ");

    // Handle generate config first
    if args.generate_config {
        let sample_config = Config::generate_sample();
        println!("{}", sample_config);
        println!("\n💡 Save this content to a .toml file and use --config /path/to/config.toml");
        return Ok(());
    }

    // Load configuration file if specified
    if let Some(config_path) = args.config.clone() {
        args = args.with_config_file(&config_path)?;
    }

    let fasta = args.fasta.clone().ok_or("--fasta is required")?;
    let outdir = if args.dry_run {
        None
    } else {
        Some(args.outdir.clone().ok_or("--outdir is required")?)
    };

    println!("🚀 microhap v{}", microhap::VERSION);

    // Validate all arguments before touching the input
    let validation_result = validate_args(&args)?;
    let config = validation_result.engine_config.clone();

    // Configure thread pool
    if let Some(n) = args.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(n)
            .build_global()
            .expect("Failed to configure thread pool");
        println!("🧵 Threads: {}", n);
    } else if config.parallel {
        let num_threads = rayon::current_num_threads();
        println!("🧵 Threads: {} (auto-detected)", num_threads);
    } else {
        println!("🧵 Sequential scan");
    }

    let total_start = Instant::now();

    // Load haplotypes
    let loaded = load_haplotype_pairs(Path::new(&fasta))?;
    let loaded_count = loaded.len();
    let samples: Vec<Sample> = loaded
        .into_iter()
        .filter(|s| validation_result.keep_sample(&s.id))
        .collect();
    if validation_result.has_sample_filters() {
        println!(
            "🔍 Sample filters kept {} of {} samples",
            samples.len(),
            loaded_count
        );
    }

    let store = HaplotypeStore::new(samples).map_err(|e| e.to_string())?;
    store
        .check_window_width(config.window_width)
        .map_err(|e| e.to_string())?;

    println!(
        "📊 Cohort: {} samples, usable length {} bp",
        store.num_samples(),
        store.usable_length()
    );
    println!(
        "📏 Window width: {} bp → {} windows",
        config.window_width,
        store.window_count(config.window_width)
    );
    println!("🎲 Seed: {}", config.seed);
    println!("🏆 Score metrics: {}", config.scoring.describe());

    if args.dry_run {
        println!("✅ Dry run completed successfully");
        return Ok(());
    }

    // Scan
    println!("\n🔄 Scanning windows...");
    let scan_start = Instant::now();
    let engine = WindowEngine::new(&store, config).map_err(|e| e.to_string())?;
    let ranked = engine.run();
    println!(
        "✅ {} windows analysed in {:.2}s ({} with a defined score)",
        ranked.len(),
        scan_start.elapsed().as_secs_f64(),
        ranked.scored()
    );

    // Write output
    let outdir = match outdir {
        Some(dir) => dir,
        None => return Ok(()),
    };
    let outdir = Path::new(&outdir);
    write_summary(outdir, validation_result.format, &ranked, &command_line)?;
    if args.no_allele_tables {
        println!("⏭️  Allele tables skipped (--no-allele-tables)");
    } else {
        write_allele_tables(outdir, &ranked)?;
    }

    print_top_windows(&ranked, args.top);

    let total_elapsed = total_start.elapsed();
    println!(
        "\n⏱️  Total execution time: {:.2}s",
        total_elapsed.as_secs_f64()
    );
    Ok(())
}

fn format_metric(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:.4}", v))
        .unwrap_or_else(|| "NA".to_string())
}

fn print_top_windows(ranked: &RankedWindows, n: usize) {
    if n == 0 || ranked.is_empty() {
        return;
    }
    println!("\n🏅 === TOP {} WINDOWS ===", n.min(ranked.len()));
    for (rank, result) in ranked.top(n).iter().enumerate() {
        let mixture = result
            .diversity_for(4)
            .map(|d| format!("{:.2}", d.expected_distinct()))
            .unwrap_or_else(|| "NA".to_string());
        println!(
            "  {:>3}. {}-{}  score={}  alleles={}  He={}  PD={}  PIC={}  E[distinct|k=4]={}",
            rank + 1,
            result.window.start_1based(),
            result.window.end_1based(),
            format_metric(result.score),
            result.num_alleles,
            format_metric(result.metrics.he),
            format_metric(result.metrics.pd),
            format_metric(result.metrics.pic),
            mixture
        );
    }
}
