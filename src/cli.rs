use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use simplelog::LevelFilter;
use tilewright_brushes::{EngineConfig, GroupPrecedence, HateFriendsScope};

use crate::dump::Region;

#[derive(Parser, Debug)]
#[command(name = "tilewright")]
#[command(about = "Paint tile maps with auto-bordering brushes")]
pub struct Cli {
    /// Log level when RUST_LOG is not set
    #[arg(long, global = true, default_value = "info")]
    pub log_level: LevelFilter,

    /// Also write the log to this file
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Load a brush file and report what it defines
    Check {
        brushes: PathBuf,
    },
    /// Run a scene script and print a region of the result
    Paint(PaintArgs),
}

#[derive(Args, Debug)]
pub struct PaintArgs {
    #[arg(long)]
    pub brushes: PathBuf,

    #[arg(long)]
    pub scene: PathBuf,

    /// Region to print: x0,y0,x1,y1,z
    #[arg(long, value_parser = Region::parse)]
    pub dump: Option<Region>,

    /// Print the region through a loopback network session
    #[arg(long)]
    pub live: bool,

    /// Override the [engine] group precedence
    #[arg(long, value_enum)]
    pub group_precedence: Option<PrecedenceArg>,

    /// Override the [engine] hate_friends scope
    #[arg(long, value_enum)]
    pub hate_friends: Option<HateFriendsArg>,
}

impl PaintArgs {
    /// Engine policy from the brush file, with command line overrides.
    pub fn engine(&self, from_file: EngineConfig) -> EngineConfig {
        EngineConfig {
            group_precedence: self
                .group_precedence
                .map_or(from_file.group_precedence, Into::into),
            hate_friends: self.hate_friends.map_or(from_file.hate_friends, Into::into),
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum PrecedenceArg {
    InitiatingBrush,
    FirstRegistered,
}

impl From<PrecedenceArg> for GroupPrecedence {
    fn from(v: PrecedenceArg) -> Self {
        match v {
            PrecedenceArg::InitiatingBrush => GroupPrecedence::InitiatingBrush,
            PrecedenceArg::FirstRegistered => GroupPrecedence::FirstRegistered,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum HateFriendsArg {
    DeclaringCenter,
    Mutual,
}

impl From<HateFriendsArg> for HateFriendsScope {
    fn from(v: HateFriendsArg) -> Self {
        match v {
            HateFriendsArg::DeclaringCenter => HateFriendsScope::DeclaringCenter,
            HateFriendsArg::Mutual => HateFriendsScope::Mutual,
        }
    }
}
