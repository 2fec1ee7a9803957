//! Interactive REPL for the Estate Explorer MCP server.
//!
//! Launch with `estate-explorer-mcp repl` to enter interactive mode.
//! Type `/help` for available commands, Tab for completion.

use std::path::{Path, PathBuf};

use rustyline::completion::{Completer, Pair};
use rustyline::config::CompletionType;
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{
    Cmd, ConditionalEventHandler, Config, Editor, Event, EventContext, EventHandler, Helper,
    KeyEvent, RepeatCount,
};

use estate_explorer::store::BUNDLE_EXTENSION;
use estate_explorer::{ArtifactStore, EstateResult, Recommendation};

use crate::config::{resolve_data_dir, ScoringConfig};
use crate::tools::ToolRegistry;

/// Available REPL commands.
const COMMANDS: &[(&str, &str)] = &[
    ("/info", "Show server capabilities and tools"),
    ("/tools", "List available MCP tools"),
    ("/load", "Load an artifact directory or .estate bundle"),
    ("/validate", "Check that an artifact set loads cleanly"),
    ("/stats", "Show artifact statistics"),
    ("/landmarks", "List known landmarks"),
    ("/nearby", "Properties near a landmark: /nearby <km> <landmark>"),
    ("/similar", "Similar properties: /similar <n> <property>"),
    ("/clear", "Clear the screen"),
    ("/help", "Show available commands"),
    ("/exit", "Quit the REPL"),
];

/// REPL helper for tab completion.
#[derive(Default)]
struct EstateHelper;

impl Completer for EstateHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &rustyline::Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let input = &line[..pos];

        if !input.contains(' ') {
            let matches: Vec<Pair> = COMMANDS
                .iter()
                .filter(|(cmd, _)| cmd.starts_with(input))
                .map(|(cmd, desc)| Pair {
                    display: format!("{cmd:<16} {desc}"),
                    replacement: format!("{cmd} "),
                })
                .collect();
            return Ok((0, matches));
        }

        // bundle and directory completion
        let (cmd, args) = input.split_once(' ').unwrap_or((input, ""));

        if cmd == "/load" || cmd == "/validate" {
            let mut entries = Vec::new();
            if let Ok(dir) = std::fs::read_dir(".") {
                for entry in dir.flatten() {
                    let path = entry.path();
                    let candidate =
                        path.is_dir() || path.extension().is_some_and(|e| e == BUNDLE_EXTENSION);
                    if candidate {
                        if let Some(name) = path.file_name().and_then(|s| s.to_str()) {
                            entries.push(name.to_string());
                        }
                    }
                }
            }
            entries.sort();
            let prefix_start = input.len() - args.len();
            let matches: Vec<Pair> = entries
                .iter()
                .filter(|f| f.starts_with(args.trim()))
                .map(|f| Pair {
                    display: f.clone(),
                    replacement: format!("{f} "),
                })
                .collect();
            return Ok((prefix_start, matches));
        }

        Ok((pos, Vec::new()))
    }
}

impl Hinter for EstateHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &rustyline::Context<'_>) -> Option<String> {
        if pos < line.len() || line.is_empty() {
            return None;
        }
        if line.starts_with('/') && !line.contains(' ') {
            for (cmd, _) in COMMANDS {
                if cmd.starts_with(line) && *cmd != line {
                    return Some(cmd[line.len()..].to_string());
                }
            }
        }
        None
    }
}

impl Highlighter for EstateHelper {}
impl Validator for EstateHelper {}
impl Helper for EstateHelper {}

struct TabCompleteOrAcceptHint;

impl ConditionalEventHandler for TabCompleteOrAcceptHint {
    fn handle(
        &self,
        _evt: &Event,
        _n: RepeatCount,
        _positive: bool,
        ctx: &EventContext<'_>,
    ) -> Option<Cmd> {
        if ctx.has_hint() {
            Some(Cmd::CompleteHint)
        } else {
            Some(Cmd::Complete)
        }
    }
}

/// Session state.
struct ReplState {
    data_path: PathBuf,
    store: Option<ArtifactStore>,
    scoring: ScoringConfig,
}

impl ReplState {
    fn new(data_path: PathBuf, scoring: ScoringConfig) -> Self {
        Self {
            data_path,
            store: None,
            scoring,
        }
    }

    /// Loaded store, loading `data_path` on first use.
    fn store(&mut self) -> Option<&ArtifactStore> {
        if self.store.is_none() {
            match ArtifactStore::load(&self.data_path) {
                Ok(store) => self.store = Some(store),
                Err(e) => {
                    eprintln!("  Cannot load {}: {e}", self.data_path.display());
                    return None;
                }
            }
        }
        self.store.as_ref()
    }

    /// Recommendations under the session's scoring policy.
    fn similar(
        &mut self,
        property: &str,
        top_n: usize,
    ) -> Option<EstateResult<Vec<Recommendation>>> {
        let weights = self.scoring.weights;
        self.store()
            .map(|store| store.recommend(property, top_n, &weights))
    }
}

/// Run the interactive REPL with the scoring policy resolved from flags and env.
pub fn run(data: Option<String>, scoring: ScoringConfig) -> anyhow::Result<()> {
    eprintln!();
    eprintln!(
        "  \x1b[32m\u{25c9}\x1b[0m \x1b[1mestate-explorer-mcp v{}\x1b[0m \x1b[90m(Gurgaon property explorer)\x1b[0m",
        env!("CARGO_PKG_VERSION")
    );
    eprintln!();
    eprintln!(
        "    Press \x1b[36m/\x1b[0m to browse commands, \x1b[90mTab\x1b[0m to complete, \x1b[90m/exit\x1b[0m to quit."
    );
    eprintln!();

    let config = Config::builder()
        .history_ignore_space(true)
        .auto_add_history(true)
        .completion_type(CompletionType::List)
        .completion_prompt_limit(20)
        .build();

    let mut rl: Editor<EstateHelper, rustyline::history::DefaultHistory> =
        Editor::with_config(config)?;
    rl.set_helper(Some(EstateHelper));
    rl.bind_sequence(
        KeyEvent::from('\t'),
        EventHandler::Conditional(Box::new(TabCompleteOrAcceptHint)),
    );

    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());
    let hist_path = PathBuf::from(&home).join(".estate_explorer_mcp_history");
    if hist_path.exists() {
        let _ = rl.load_history(&hist_path);
    }

    let mut state = ReplState::new(resolve_data_dir(data.as_deref()), scoring);
    let prompt = " \x1b[36mestate>\x1b[0m ";

    loop {
        match rl.readline(prompt) {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                let input = line.strip_prefix('/').unwrap_or(line);
                if input.is_empty() {
                    cmd_help();
                    continue;
                }

                let (cmd, args) = input.split_once(' ').unwrap_or((input, ""));
                let args = args.trim();

                match cmd {
                    "exit" | "quit" => {
                        eprintln!("  Goodbye!");
                        break;
                    }
                    "help" | "h" | "?" => cmd_help(),
                    "clear" | "cls" => eprint!("\x1b[2J\x1b[H"),
                    "info" => cmd_info(),
                    "tools" => cmd_tools(),
                    "validate" => cmd_validate(args, &state),
                    "load" => cmd_load(args, &mut state),
                    "stats" => cmd_stats(&mut state),
                    "landmarks" => cmd_landmarks(&mut state),
                    "nearby" => cmd_nearby(args, &mut state),
                    "similar" => cmd_similar(args, &mut state),
                    _ => {
                        eprintln!("  Unknown command '/{cmd}'. Type /help for commands.");
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                eprintln!("  \x1b[90m(Ctrl+C)\x1b[0m Type \x1b[1m/exit\x1b[0m to quit.");
            }
            Err(ReadlineError::Eof) => {
                eprintln!("  Goodbye!");
                break;
            }
            Err(err) => {
                eprintln!("  Error: {err}");
                break;
            }
        }
    }

    let _ = std::fs::create_dir_all(hist_path.parent().unwrap_or(Path::new(".")));
    let _ = rl.save_history(&hist_path);

    Ok(())
}

fn cmd_help() {
    eprintln!();
    eprintln!("  Commands:");
    eprintln!();
    for (cmd, desc) in COMMANDS {
        eprintln!("    {cmd:<18} {desc}");
    }
    eprintln!();
    eprintln!("  Tip: Tab completion works for commands, directories and .estate bundles.");
    eprintln!();
}

fn cmd_info() {
    let capabilities = crate::types::InitializeResult::default_result();
    let tools = ToolRegistry::list_tools();
    eprintln!();
    eprintln!(
        "  Server:   {} v{}",
        capabilities.server_info.name, capabilities.server_info.version
    );
    eprintln!("  Protocol: {}", capabilities.protocol_version);
    eprintln!("  Tools:    {}", tools.len());
    eprintln!();
}

fn cmd_tools() {
    let tools = ToolRegistry::list_tools();
    eprintln!();
    eprintln!("  {} MCP tools available:", tools.len());
    eprintln!();
    for tool in &tools {
        eprintln!(
            "    {:<22} {}",
            tool.name,
            tool.description.as_deref().unwrap_or("")
        );
    }
    eprintln!();
}

fn print_stats(path: &Path, store: &ArtifactStore) {
    let stats = store.stats();
    eprintln!();
    eprintln!("  Artifacts: {}", path.display());
    eprintln!("    Properties: {}", stats.properties);
    eprintln!("    Landmarks:  {}", stats.landmarks);
    eprintln!("    Sectors:    {}", stats.sectors);
    match stats.market_listings {
        Some(n) => eprintln!("    Listings:   {n}"),
        None => eprintln!("    Listings:   (not loaded)"),
    }
    eprintln!();
}

fn cmd_validate(args: &str, state: &ReplState) {
    let path = if args.is_empty() {
        state.data_path.clone()
    } else {
        PathBuf::from(args)
    };

    match ArtifactStore::load(&path) {
        Ok(store) => print_stats(&path, &store),
        Err(e) => eprintln!("  Invalid artifacts: {e}"),
    }
}

fn cmd_load(args: &str, state: &mut ReplState) {
    if args.is_empty() {
        eprintln!("  Usage: /load <dir | file.{BUNDLE_EXTENSION}>");
        return;
    }
    let path = PathBuf::from(args);
    match ArtifactStore::load(&path) {
        Ok(store) => {
            eprintln!(
                "  Loaded: {} ({} properties, {} landmarks)",
                path.display(),
                store.index().len(),
                store.landmarks().len()
            );
            state.data_path = path;
            state.store = Some(store);
        }
        Err(e) => eprintln!("  Failed to load: {e}"),
    }
}

fn cmd_stats(state: &mut ReplState) {
    let path = state.data_path.clone();
    if let Some(store) = state.store() {
        print_stats(&path, store);
    }
}

fn cmd_landmarks(state: &mut ReplState) {
    if let Some(store) = state.store() {
        eprintln!();
        for landmark in store.landmarks() {
            eprintln!("    {landmark}");
        }
        eprintln!();
    }
}

fn cmd_nearby(args: &str, state: &mut ReplState) {
    let Some((radius, landmark)) = args
        .split_once(' ')
        .and_then(|(r, l)| r.parse::<f64>().ok().map(|r| (r, l.trim())))
    else {
        eprintln!("  Usage: /nearby <radius_km> <landmark>");
        return;
    };
    let Some(store) = state.store() else { return };

    match store.nearby(landmark, radius) {
        Ok(result) if result.is_empty() => {
            eprintln!("  No apartments found within the selected radius.");
        }
        Ok(result) => {
            eprintln!();
            for n in &result.neighbors {
                eprintln!("    {:<40} {:>8.2} km", n.property, n.distance_km);
            }
            eprintln!();
        }
        Err(e) => eprintln!("  {e}"),
    }
}

fn cmd_similar(args: &str, state: &mut ReplState) {
    let Some((top_n, property)) = args
        .split_once(' ')
        .and_then(|(n, p)| n.parse::<usize>().ok().map(|n| (n, p.trim())))
    else {
        eprintln!("  Usage: /similar <n> <property>");
        return;
    };
    let Some(result) = state.similar(property, top_n) else {
        return;
    };

    match result {
        Ok(recommendations) => {
            eprintln!();
            for r in &recommendations {
                eprintln!("    {:<40} {:>7.3}", r.property, r.score);
            }
            eprintln!();
        }
        Err(e) => eprintln!("  {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use estate_explorer::SimilarityWeights;

    fn write_artifacts(dir: &Path) {
        let sim = |rows: [&str; 3]| {
            format!(
                "property_name,Property X,Property Y,Property Z\n\
                 Property X,{}\nProperty Y,{}\nProperty Z,{}\n",
                rows[0], rows[1], rows[2]
            )
        };
        let files = [
            (
                "reference.csv",
                "property_type,sector,price,bedRoom,bathroom,balcony,agePossession,built_up_area,servant room,store room,furnishing_type,luxury_category,floor_category\n\
                 flat,sector 45,1.2,3.0,3.0,3+,New Property,1650,0.0,0.0,semifurnished,Medium,Mid Floor\n"
                    .to_string(),
            ),
            (
                "location_distance.csv",
                "property_name,Cyber Hub\nProperty X,500\nProperty Y,1500\nProperty Z,2500\n"
                    .to_string(),
            ),
            ("cosine_sim1.csv", sim(["1.0,0.2,0.1", "0.2,1.0,0.4", "0.1,0.4,1.0"])),
            ("cosine_sim2.csv", sim(["1.0,0.5,0.3", "0.5,1.0,0.2", "0.3,0.2,1.0"])),
            ("cosine_sim3.csv", sim(["1.0,0.6,0.9", "0.6,1.0,0.7", "0.9,0.7,1.0"])),
        ];
        for (name, body) in files {
            std::fs::write(dir.join(name), body).unwrap();
        }
    }

    fn top_match(state: &mut ReplState) -> String {
        let recs = state.similar("Property X", 1).unwrap().unwrap();
        recs[0].property.clone()
    }

    #[test]
    fn test_similar_uses_configured_weights() {
        let dir = tempfile::tempdir().unwrap();
        write_artifacts(dir.path());

        let mut defaults = ReplState::new(dir.path().to_path_buf(), ScoringConfig::default());
        assert_eq!(top_match(&mut defaults), "Property Z");

        let name_only = ScoringConfig {
            weights: SimilarityWeights::new(1.0, 0.0, 0.0).unwrap(),
            ..ScoringConfig::default()
        };
        let mut configured = ReplState::new(dir.path().to_path_buf(), name_only);
        assert_eq!(top_match(&mut configured), "Property Y");
    }

    #[test]
    fn test_similar_without_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = ReplState::new(dir.path().join("missing"), ScoringConfig::default());
        assert!(state.similar("Property X", 1).is_none());
    }
}
