use clap::Parser;
use scribe::cli::{
    handle_completions, handle_config_init, handle_credentials, handle_evaluate, Cli, Commands,
    ConfigCommands,
};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Serve(args) => scribe::cli::serve::run_serve(args).await,
        Commands::Evaluate(args) => handle_evaluate(&args).await.map(|output| {
            println!("{}", output);
        }),
        Commands::Credentials(args) => handle_credentials(&args).map(|output| {
            println!("{}", output);
        }),
        Commands::Config(config_cmd) => match config_cmd {
            ConfigCommands::Init(args) => handle_config_init(&args).map(|output| {
                println!("{}", output);
            }),
        },
        Commands::Completions(args) => {
            handle_completions(&args);
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
