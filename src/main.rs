use std::path::PathBuf;
use clap::{Args, Parser, Subcommand};
use log::debug;

use llmbatch::{
  ApiConfig, Config, ModelClient, RetryConfig, ScholarClient,
  ScholarConfig, PLACEHOLDER,
};

#[derive(Debug, Parser)]
#[command(name = "llmbatch")]
#[command(about = "Batch chat completions and paper search", version)]
struct Cli
{   #[command(subcommand)]
    command: Commands
}

#[derive(Debug, Subcommand)]
enum Commands
{   /// Search Semantic Scholar by keywords
    Search(SearchArgs)
  , /// Send one or more prompts to the chat endpoint
    Chat(ChatArgs)
}

#[derive(Debug, Args)]
struct SearchArgs
{   #[arg(required = true, help = "Keywords to search for")]
    keywords: Vec<String>
  , #[arg(long, help = "Maximum number of results")]
    limit: Option<u32>
  , #[arg(long, env = "S2_API_KEY", help = "Semantic Scholar partner key")]
    api_key: Option<String>
}

#[derive(Debug, Args)]
struct ChatArgs
{   #[arg(required = true, help = "Prompts; more than one runs a batch")]
    prompts: Vec<String>
  , #[arg(long, default_value_t = 1.0)]
    temperature: f32
  , #[arg(
      long,
      help = "JSON config file (defaults to LLM_* environment variables)"
    )]
    config: Option<PathBuf>
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>>
{   env_logger::init();
    let cli = Cli::parse();
    match cli.command
    {   Commands::Search(args) => search_command(args).await?
      , Commands::Chat(args) => chat_command(args).await?
    }
    Ok(())
}

async fn search_command(args: SearchArgs)
  -> Result<(), Box<dyn std::error::Error>>
{   let config = ScholarConfig
    {   api_key: args.api_key
      , ..ScholarConfig::default()
    };
    let client = ScholarClient::new(config)?;
    let query = args.keywords.join(" ");
    let page = client.search_paper(&query, args.limit).await?;

    println!("Total result count: {}", page.total);
    if let Some(first) = page.data.first()
    {   println!("First result in details: {:#?}", first);
    }
    for paper in &page.data
    {   println!("{}", paper.title.as_deref().unwrap_or("<untitled>"));
    }
    Ok(())
}

async fn chat_command(args: ChatArgs)
  -> Result<(), Box<dyn std::error::Error>>
{   let client = match &args.config
    {   Some(path) => ModelClient::from_config(&Config::from_json_file(path)?)?
      , None => ModelClient::new(
          ApiConfig::from_env()?,
          RetryConfig::default()
        )?
    };
    debug!("Using {:?}", client);

    if let [prompt] = args.prompts.as_slice()
    {   match client.chat(prompt, args.temperature).await
        {   Some(answer) => println!("{}", answer)
          , None => eprintln!("{}", PLACEHOLDER)
        }
        return Ok(());
    }

    let answers = client
      .batch_chat(&args.prompts, args.temperature)
      .await;
    for (idx, answer) in answers.iter().enumerate()
    {   println!("[{}] {}", idx, answer);
    }
    Ok(())
}
