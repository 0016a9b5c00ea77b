#![forbid(unsafe_code)]

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use spacemesh_tool::{
    read_checksummed, run_poet_probe, state_file::checksum, FiatShamir, MultiProofVerifier,
    NipostBuilderState, NipostChallenge, Position, PostMetadata, ProbeParams, DEFAULT_LEAF_COUNT, T,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "smtool", version)]
#[command(about = "Spacemesh node inspection tooling", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Merkle node arithmetic; nodes are written height:index
    #[command(subcommand)]
    Merkle(MerkleCommand),
    /// Proofs of concept
    #[command(subcommand)]
    Poc(PocCommand),
    /// ATX related files
    #[command(subcommand)]
    Atx(AtxCommand),
    /// NIPost state files
    #[command(subcommand)]
    Nipost(NipostCommand),
}

#[derive(Subcommand)]
enum MerkleCommand {
    /// Check whether ANCESTOR is an ancestor of DESCENDANT
    #[command(name = "is_ancestor")]
    IsAncestor {
        #[arg(value_name = "ANCESTOR")]
        ancestor: Position,
        #[arg(value_name = "DESCENDANT")]
        descendant: Position,
    },
    /// Print the sibling node
    Sibling {
        #[arg(value_name = "NODE")]
        node: Position,
    },
    /// Print the parent node
    Parent {
        #[arg(value_name = "NODE")]
        node: Position,
    },
    /// Check whether the node is a right child
    #[command(name = "is_right")]
    IsRight {
        #[arg(value_name = "NODE")]
        node: Position,
    },
    /// Print the node's left and right child
    Children {
        #[arg(value_name = "NODE")]
        node: Position,
    },
}

#[derive(Subcommand)]
enum PocCommand {
    /// Find a self-selecting PoET root and submit a one-leaf proof to the verifier
    Poet {
        #[arg(long, default_value_t = DEFAULT_LEAF_COUNT)]
        leaf_count: u64,
        /// Number of leaves Fiat–Shamir selects
        #[arg(long, default_value_t = T)]
        challenges: u64,
        /// Membership root seeding the label and Merkle hashes, hex
        #[arg(long, default_value = "")]
        seed: String,
    },
}

#[derive(Subcommand)]
enum AtxCommand {
    /// Decode atx and node ids from postdata_metadata.json into hex
    Meta {
        #[arg(long)]
        path: PathBuf,
    },
}

#[derive(Subcommand)]
enum NipostCommand {
    /// Decode NIPostChallenge from nipost_challenge.bin
    Challenge {
        #[arg(long)]
        path: PathBuf,
    },
    /// Decode the challenge hash of nipost_builder_state.bin
    Bs {
        #[arg(long)]
        path: PathBuf,
    },
    /// Verify a state file's checksum trailer and dump the payload as hex
    Raw {
        #[arg(long)]
        path: PathBuf,
    },
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run_merkle(cmd: MerkleCommand) -> Result<()> {
    match cmd {
        MerkleCommand::IsAncestor { ancestor, descendant } => {
            println!("{}", ancestor.is_ancestor_of(descendant));
        }
        MerkleCommand::Sibling { node } => println!("{}", node.sibling()),
        MerkleCommand::Parent { node } => println!("{}", node.parent()?),
        MerkleCommand::IsRight { node } => println!("{}", node.is_right_sibling()),
        MerkleCommand::Children { node } => {
            let (left, right) = node.children()?;
            println!("{left} {right}");
        }
    }
    Ok(())
}

fn run_poc(cmd: PocCommand) -> Result<()> {
    match cmd {
        PocCommand::Poet { leaf_count, challenges, seed } => {
            let seed = hex::decode(seed.trim_start_matches("0x")).context("decode --seed hex")?;
            let params = ProbeParams { leaf_count, challenges, seed };
            let label_hash = params.label_hash();
            let verifier = MultiProofVerifier::new(params.merkle_hash());
            let report = run_poet_probe(&params, &label_hash, &FiatShamir, &verifier)?;

            println!("candidate index {}", report.candidate.index);
            println!("root {}", hex::encode(report.candidate.label));
            report.outcome.context("verifier rejected probe proof")?;
            println!("proof accepted");
        }
    }
    Ok(())
}

fn run_atx(cmd: AtxCommand) -> Result<()> {
    match cmd {
        AtxCommand::Meta { path } => {
            let meta = PostMetadata::load(&path)?;
            println!("CommitmentAtxId {}", hex::encode(&meta.commitment_atx_id));
            println!("NodeId {}", hex::encode(&meta.node_id));
            println!("NumUnits {}", meta.num_units);
            println!("LabelsPerUnit {}", meta.labels_per_unit);
            println!("TotalLabels {}", meta.total_labels());
            println!("MaxFileSize {}", meta.max_file_size);
            if let Some(nonce) = meta.nonce {
                println!("Nonce {nonce}");
            }
            if let Some(last) = meta.last_position {
                println!("LastPosition {last}");
            }
        }
    }
    Ok(())
}

fn run_nipost(cmd: NipostCommand) -> Result<()> {
    match cmd {
        NipostCommand::Challenge { path } => {
            let ch = NipostChallenge::load(&path)
                .with_context(|| format!("load {}", path.display()))?;
            println!("PublishEpoch {}", ch.publish_epoch);
            println!("Sequence {}", ch.sequence);
            if let Some(commitment) = ch.commitment_atx {
                println!("CommitmentATX 0x{}", hex::encode(commitment));
            }
            println!("PositioningATX 0x{}", hex::encode(ch.positioning_atx));
            println!("PrevATXID 0x{}", hex::encode(ch.prev_atx_id));
            if let Some(post) = ch.initial_post {
                println!(
                    "InitialPost nonce={} indices={} pow={}",
                    post.nonce,
                    hex::encode(&post.indices),
                    post.pow
                );
            }
        }
        NipostCommand::Bs { path } => {
            let bs = NipostBuilderState::load(&path)
                .with_context(|| format!("load {}", path.display()))?;
            println!("Challenge 0x{}", hex::encode(bs.challenge));
            println!("undecoded {} bytes", bs.tail.len());
        }
        NipostCommand::Raw { path } => {
            let payload = read_checksummed(&path)
                .with_context(|| format!("load {}", path.display()))?;
            println!("payload_len {}", payload.len());
            println!("checksum 0x{:016X}", checksum(&payload));
            println!("payload {}", hex::encode(&payload));
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    debug!(version = spacemesh_tool::VERSION, "smtool starting");

    match cli.command {
        Commands::Merkle(cmd) => run_merkle(cmd),
        Commands::Poc(cmd) => run_poc(cmd),
        Commands::Atx(cmd) => run_atx(cmd),
        Commands::Nipost(cmd) => run_nipost(cmd),
    }
}
