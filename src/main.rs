//! Command-line front-end for the voice-agent simulator.
//!
//! # Startup sequence
//!
//! 1. Initialise logging (`RUST_LOG` overrides the `info` default).
//! 2. Load [`AppConfig`] from `--config` or the platform config dir.
//! 3. Apply command-line overrides (seed, instant, width).
//! 4. Build the [`StageSet`] from config and dispatch the subcommand.

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use futures::StreamExt;
use serde_json::{Map, Value};

use voice_agent_sim::{
    agents::{AgentRegistry, NewAgent},
    audio::WaveformData,
    config::{AppConfig, AppPaths},
    pipeline::{SimulationSession, StageSet, StepData, VoiceAgentSimulator},
    stages::ToolCall,
};

// ---------------------------------------------------------------------------
// Arguments
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[clap(name = "voice-agent-sim", about = "Simulate a voice agent's STT → LLM → TTS pipeline")]
struct Args {
    /// Settings file to use instead of the platform default.
    #[clap(long, global = true)]
    config: Option<PathBuf>,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one simulated conversation turn.
    Simulate {
        /// System prompt for the language model.
        #[clap(long, conflicts_with = "agent")]
        prompt: Option<String>,
        /// Run as a stored agent, using its system prompt.
        #[clap(long)]
        agent: Option<String>,
        /// Number of waveform bars.
        #[clap(long)]
        width: Option<usize>,
        /// Seed for reproducible runs.
        #[clap(long)]
        seed: Option<u64>,
        /// Skip the simulated delays.
        #[clap(long)]
        instant: bool,
    },
    /// Call the tool stub and print its result.
    Tool {
        name: String,
        /// Parameter as key=value; repeatable.
        #[clap(long = "param", value_parser = parse_param)]
        params: Vec<(String, String)>,
    },
    /// Analyse text with the transform stub.
    Transform { text: String },
    /// Manage stored agents.
    Agents {
        #[clap(subcommand)]
        command: AgentsCommand,
    },
    /// Inspect or create the settings file.
    Config {
        #[clap(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Print the effective settings as TOML.
    Show,
    /// Write default settings.
    Init {
        /// Replace an existing file.
        #[clap(long)]
        force: bool,
    },
}

#[derive(Subcommand, Debug)]
enum AgentsCommand {
    List,
    Show {
        id: String,
    },
    Create {
        #[clap(long)]
        name: String,
        #[clap(long)]
        prompt: String,
        #[clap(long)]
        domain: Option<String>,
        #[clap(long)]
        description: Option<String>,
    },
    Duplicate {
        id: String,
    },
    Delete {
        id: String,
    },
}

fn parse_param(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected key=value, got `{s}`"))
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let (config, paths) = match &args.config {
        Some(path) => {
            let dir = path.parent().map(PathBuf::from).unwrap_or_default();
            let config = AppConfig::load_from(path)
                .with_context(|| format!("loading {}", path.display()))?;
            (config, AppPaths::in_dir(dir))
        }
        None => (
            AppConfig::load().unwrap_or_else(|e| {
                log::warn!("Failed to load config ({e}); using defaults");
                AppConfig::default()
            }),
            AppPaths::new(),
        ),
    };

    match args.command {
        Command::Simulate {
            prompt,
            agent,
            width,
            seed,
            instant,
        } => {
            let mut config = config;
            if seed.is_some() {
                config.simulation.seed = seed;
            }
            config.simulation.instant |= instant;
            if let Some(width) = width {
                config.simulation.waveform_width = width;
            }
            simulate(&config, &paths, prompt, agent).await
        }
        Command::Tool { name, params } => {
            let simulator = VoiceAgentSimulator::new(StageSet::from_config(&config));
            let parameters: Map<String, Value> = params
                .into_iter()
                .map(|(k, v)| (k, Value::String(v)))
                .collect();
            let call = ToolCall { name, parameters };
            let result = simulator.call_tool(&call).await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(())
        }
        Command::Transform { text } => {
            let simulator = VoiceAgentSimulator::new(StageSet::from_config(&config));
            let output = simulator.transform(Value::String(text)).await?;
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(())
        }
        Command::Agents { command } => agents(&paths, command),
        Command::Config { command } => {
            let settings_file = args.config.unwrap_or(paths.settings_file);
            match command {
                ConfigCommand::Show => print!("{}", toml::to_string_pretty(&config)?),
                ConfigCommand::Init { force } => {
                    if AppConfig::init_at(&settings_file, force)? {
                        println!("wrote {}", settings_file.display());
                    } else {
                        println!("{} already exists (use --force)", settings_file.display());
                    }
                }
            }
            Ok(())
        }
    }
}

// ---------------------------------------------------------------------------
// Subcommands
// ---------------------------------------------------------------------------

async fn simulate(
    config: &AppConfig,
    paths: &AppPaths,
    prompt: Option<String>,
    agent_id: Option<String>,
) -> Result<()> {
    let prompt = match &agent_id {
        Some(id) => {
            let registry = AgentRegistry::load_from(&paths.agents_file)?;
            let agent = registry
                .get(id)
                .ok_or_else(|| anyhow!("no agent with id {id}"))?;
            log::info!("simulating as agent \"{}\"", agent.name);
            Some(agent.system_prompt.clone())
        }
        None => prompt,
    };

    let simulator = VoiceAgentSimulator::new(StageSet::from_config(config))
        .with_default_prompt(config.simulation.default_system_prompt.clone());
    let mut session = SimulationSession::new(agent_id);
    session.start();

    let mut steps = Box::pin(simulator.simulate_conversation(&[], prompt.as_deref()));
    while let Some(step) = steps.next().await {
        match step.latency {
            Some(ms) => println!("[{:>5}] {} ({ms} ms)", step.step.label(), step.message),
            None => println!("[{:>5}] {}", step.step.label(), step.message),
        }
        if let Some(error) = &step.error {
            println!("        {error}");
        }
        if let Some(StepData::Audio(audio)) = &step.data {
            let waveform = WaveformData::compute(&audio.samples, config.simulation.waveform_width);
            println!(
                "        {:.1}s, {} bars: {}",
                audio.duration,
                waveform.len(),
                waveform.sparkline()
            );
        }
        session.record(&step);
    }

    println!();
    println!("session {} ({})", session.id, session.status.label());
    let m = &session.metrics;
    println!(
        "  latency: total {} ms, stt {} ms, llm {} ms, tts {} ms",
        m.total_latency, m.stt_latency, m.llm_latency, m.tts_latency
    );
    println!("  tokens: {}, errors: {}", m.tokens_used, m.error_count);
    Ok(())
}

fn agents(paths: &AppPaths, command: AgentsCommand) -> Result<()> {
    let mut registry = AgentRegistry::load_from(&paths.agents_file)?;

    match command {
        AgentsCommand::List => {
            if registry.is_empty() {
                println!("no agents in {}", registry.path().display());
            }
            for agent in registry.list() {
                let draft = if agent.is_draft { " [draft]" } else { "" };
                println!("{}  {}{draft}", agent.id, agent.name);
            }
        }
        AgentsCommand::Show { id } => {
            let agent = registry
                .export(&id)
                .ok_or_else(|| anyhow!("no agent with id {id}"))?;
            println!("{}", serde_json::to_string_pretty(&agent)?);
        }
        AgentsCommand::Create {
            name,
            prompt,
            domain,
            description,
        } => {
            let agent = registry.create(NewAgent {
                domain,
                description,
                ..NewAgent::new(name, prompt)
            })?;
            println!("created {}", agent.id);
        }
        AgentsCommand::Duplicate { id } => {
            let copy = registry.duplicate(&id)?;
            println!("created {} ({})", copy.id, copy.name);
        }
        AgentsCommand::Delete { id } => {
            let removed = registry.delete(&id)?;
            println!("deleted {} ({})", removed.id, removed.name);
        }
    }
    Ok(())
}
