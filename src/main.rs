//! Chitra CLI - Convolution Image Filtering
//!
//! This is a demonstration CLI for the Chitra library.

use chitra::prelude::*;
use std::sync::Arc;

fn main() {
    env_logger::init();
    println!("🎨 Chitra - Convolution Image Filtering v{}", chitra::VERSION);
    println!();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage(&args[0]);
        return;
    }

    match args[1].as_str() {
        "kernels" => list_kernels(),
        "info" => {
            if args.len() < 3 {
                eprintln!("Error: Please specify a kernel name");
                return;
            }
            kernel_info(&args[2]);
        }
        "apply" => {
            if args.len() < 4 {
                eprintln!("Error: Please specify input and output paths");
                eprintln!(
                    "Usage: {} apply <input> <output> [--kernel <name>] [--mode sequential|parallel]",
                    args[0]
                );
                return;
            }
            if let Err(e) = apply(&args[2..]) {
                eprintln!("❌ {e:#}");
                std::process::exit(1);
            }
        }
        "help" | "--help" | "-h" => print_usage(&args[0]),
        _ => {
            eprintln!("Unknown command: {}", args[1]);
            print_usage(&args[0]);
        }
    }
}

fn print_usage(program: &str) {
    println!("Usage: {} <command> [options]", program);
    println!();
    println!("Commands:");
    println!("  kernels           List all registered kernels");
    println!("  info <kernel>     Show a kernel's weight grid");
    println!("  apply <in> <out> [options]  Convolve an image");
    println!("  help              Show this help message");
    println!();
    println!("Apply options:");
    println!("  --kernel <name>        Kernel to apply (default: blur)");
    println!("  --mode <seq|par>       Execution strategy (default: parallel)");
    println!("  --kernels-file <path>  Register extra kernels from a JSON file");
    println!("  --quality <1-100>      JPEG quality (default: 90)");
}

fn list_kernels() {
    let catalog = KernelCatalog::with_builtins();

    println!("Registered kernels ({} total):", catalog.len());
    println!();
    for (name, kernel) in catalog.kernels() {
        println!(
            "  • {:<12} {}x{}, weight sum {:.3}",
            name,
            kernel.rows(),
            kernel.cols(),
            kernel.sum()
        );
    }
}

fn kernel_info(name: &str) {
    let catalog = KernelCatalog::with_builtins();

    match catalog.lookup(name) {
        Ok(kernel) => {
            println!("Kernel: {}", name);
            println!(
                "Size: {}x{} (center offset {}, {})",
                kernel.rows(),
                kernel.cols(),
                kernel.offset_x(),
                kernel.offset_y()
            );
            println!("Weight sum: {:.4}", kernel.sum());
            println!();
            print!("{}", kernel);
        }
        Err(_) => {
            eprintln!("Kernel not found: {}", name);
            eprintln!("Use 'kernels' to see what is registered.");
        }
    }
}

fn apply(args: &[String]) -> anyhow::Result<()> {
    let input = &args[0];
    let output = &args[1];

    // Parse options
    let mut kernel_name = "blur".to_string();
    let mut mode = Strategy::Parallel;
    let mut kernels_file: Option<String> = None;
    let mut quality = chitra::io::DEFAULT_JPEG_QUALITY;

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--kernel" if i + 1 < args.len() => {
                kernel_name = args[i + 1].clone();
                i += 2;
            }
            "--mode" if i + 1 < args.len() => {
                mode = match args[i + 1].as_str() {
                    "sequential" | "seq" => Strategy::Sequential,
                    "parallel" | "par" => Strategy::Parallel,
                    other => anyhow::bail!("unknown mode: {}", other),
                };
                i += 2;
            }
            "--kernels-file" if i + 1 < args.len() => {
                kernels_file = Some(args[i + 1].clone());
                i += 2;
            }
            "--quality" if i + 1 < args.len() => {
                quality = args[i + 1]
                    .parse()
                    .map_err(|_| anyhow::anyhow!("quality must be 1-100"))?;
                i += 2;
            }
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                i += 1;
            }
        }
    }

    let mut catalog = KernelCatalog::with_builtins();
    if let Some(path) = kernels_file {
        let count = catalog.register_from_file(&path)?;
        println!("📁 Registered {} kernel(s) from {}", count, path);
    }
    let kernel = catalog.lookup(&kernel_name)?;

    let source = chitra::io::load_image(input)?;
    println!(
        "⚙️  Applying '{}' to {} ({}x{}, {:?})",
        kernel_name,
        input,
        source.width(),
        source.height(),
        mode
    );

    let engine = ConvolutionEngine::new();
    let controller = ExecutionController::new();
    let sink: Arc<dyn ProgressSink> = Arc::new(|pct: f64| {
        use std::io::Write;
        print!("\r   {:5.1}%", pct);
        let _ = std::io::stdout().flush();
    });

    let started = std::time::Instant::now();
    let filtered = controller.run(&engine, &source, kernel, mode, Some(sink))?;
    println!();
    println!("✅ Complete in {}ms", started.elapsed().as_millis());

    chitra::io::save_image_with_quality(&filtered, output, quality)?;
    println!("🎉 Saved to {}", output);
    Ok(())
}
