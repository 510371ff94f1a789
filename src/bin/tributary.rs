//! Tributary CLI: lineage catalog and lineage explorer.
//!
//! Usage:
//!   tributary entity <subcommand> [--db path]
//!   tributary lineage <subcommand> [--db path]
//!   tributary explore <type:fqn> [--expand <type:fqn>@<to|from>]...
//!
//! Entities are written `type:fullyQualifiedName`, e.g. `table:mysql.shop.public.orders`.

use clap::{Parser, Subcommand};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use tributary::{
    Edge, EntityId, EntityReference, LineageDepth, LineageDetails, LineageDirection, LineageSession,
    LineageStore, MergePolicy, OpenStore, SqliteStore, StoreSource, TributaryConfig,
};

#[derive(Parser)]
#[command(
    name = "tributary",
    version,
    about = "Incremental data-lineage graph assembler"
)]
struct Cli {
    /// Path to config file (default: <config dir>/tributary/config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Path to SQLite database file (overrides the config)
    #[arg(long, global = true)]
    db: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage catalog entities
    Entity {
        #[command(subcommand)]
        action: EntityAction,
    },
    /// Manage lineage edges
    Lineage {
        #[command(subcommand)]
        action: LineageAction,
    },
    /// Open a lineage view and expand nodes in it, printing the result as JSON
    Explore {
        /// Focal entity (type:fqn)
        entity: String,
        /// Node to expand, as type:fqn@to or type:fqn@from (repeatable, applied in order)
        #[arg(long = "expand")]
        expansions: Vec<String>,
        /// Key nodes and edges so repeated merges do not duplicate them
        #[arg(long)]
        dedupe: bool,
    },
}

#[derive(Subcommand)]
enum EntityAction {
    /// Register an entity
    Add {
        /// Entity as type:fqn
        entity: String,
        /// Explicit id (default: random UUID)
        #[arg(long)]
        id: Option<String>,
        /// Display name
        #[arg(long)]
        display_name: Option<String>,
    },
    /// List all entities
    List,
    /// Remove an entity and its lineage
    Remove {
        /// Entity as type:fqn
        entity: String,
    },
}

#[derive(Subcommand)]
enum LineageAction {
    /// Record that data flows from one entity into another
    Add {
        /// Upstream entity (type:fqn)
        from: String,
        /// Downstream entity (type:fqn)
        to: String,
        /// Pipeline moving the data (type:fqn)
        #[arg(long)]
        pipeline: Option<String>,
        /// SQL producing the downstream entity
        #[arg(long)]
        sql: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    /// Remove a lineage edge
    Remove {
        from: String,
        to: String,
    },
    /// Print the lineage around an entity as JSON
    Show {
        /// Entity (type:fqn)
        entity: String,
        #[arg(long)]
        upstream_depth: Option<u32>,
        #[arg(long)]
        downstream_depth: Option<u32>,
    },
}

/// Split `type:fqn`
fn parse_locator(locator: &str) -> Result<(&str, &str), String> {
    match locator.split_once(':') {
        Some((entity_type, fqn)) if !entity_type.is_empty() && !fqn.is_empty() => Ok((entity_type, fqn)),
        _ => Err(format!("expected type:fqn, got '{}'", locator)),
    }
}

/// Split `type:fqn@direction`
fn parse_expansion(spec: &str) -> Result<(&str, LineageDirection), String> {
    let (locator, direction) = spec
        .rsplit_once('@')
        .ok_or_else(|| format!("expected type:fqn@to or type:fqn@from, got '{}'", spec))?;
    let direction = direction.parse::<LineageDirection>().map_err(|e| e.to_string())?;
    Ok((locator, direction))
}

fn resolve(store: &SqliteStore, locator: &str) -> Result<EntityReference, String> {
    let (entity_type, fqn) = parse_locator(locator)?;
    store
        .find_entity_by_name(entity_type, fqn)
        .map_err(|e| e.to_string())?
        .ok_or_else(|| format!("entity '{}' not found", locator))
}

fn open_store(path: &Path) -> Result<SqliteStore, String> {
    SqliteStore::open(path).map_err(|e| format!("Failed to open database: {}", e))
}

fn init_logging(config: &TributaryConfig) {
    let filter = EnvFilter::try_from_env("TRIBUTARY_LOG")
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_json(value: &impl serde::Serialize) -> i32 {
    match serde_json::to_string_pretty(value) {
        Ok(text) => {
            println!("{}", text);
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

/// Fail if `type:fqn` is already in the catalog or the lookup itself fails
fn ensure_unregistered(store: &SqliteStore, entity_type: &str, fqn: &str) -> Result<(), String> {
    match store.find_entity_by_name(entity_type, fqn) {
        Ok(None) => Ok(()),
        Ok(Some(existing)) => Err(format!(
            "entity '{}:{}' already exists ({})",
            entity_type, fqn, existing.id
        )),
        Err(e) => Err(e.to_string()),
    }
}

fn cmd_entity_add(store: &SqliteStore, locator: &str, id: Option<String>, display_name: Option<String>) -> i32 {
    let (entity_type, fqn) = match parse_locator(locator) {
        Ok(parts) => parts,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    if let Err(e) = ensure_unregistered(store, entity_type, fqn) {
        eprintln!("Error: {}", e);
        return 1;
    }
    let id = id.map(EntityId::from).unwrap_or_default();
    let mut entity = EntityReference::with_id(id, entity_type, fqn);
    entity.display_name = display_name;
    match store.save_entity(&entity) {
        Ok(()) => {
            println!("Added {} '{}' ({})", entity.entity_type, entity.fully_qualified_name, entity.id);
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn cmd_entity_list(store: &SqliteStore) -> i32 {
    let entities = match store.list_entities() {
        Ok(entities) => entities,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    if entities.is_empty() {
        println!("No entities defined.");
        return 0;
    }
    println!("{:<36}  {:<12}  {}", "ID", "TYPE", "FQN");
    println!("{}", "-".repeat(72));
    for entity in entities {
        println!("{:<36}  {:<12}  {}", entity.id, entity.entity_type, entity.fully_qualified_name);
    }
    0
}

fn cmd_entity_remove(store: &SqliteStore, locator: &str) -> i32 {
    let entity = match resolve(store, locator) {
        Ok(entity) => entity,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    match store.delete_entity(&entity.id) {
        Ok(_) => {
            println!("Removed '{}'", locator);
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn cmd_lineage_add(
    store: &SqliteStore,
    from: &str,
    to: &str,
    pipeline: Option<&str>,
    sql: Option<String>,
    description: Option<String>,
) -> i32 {
    let endpoints = resolve(store, from).and_then(|f| resolve(store, to).map(|t| (f, t)));
    let (from_entity, to_entity) = match endpoints {
        Ok(pair) => pair,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    let pipeline = match pipeline.map(|p| resolve(store, p)).transpose() {
        Ok(pipeline) => pipeline,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };

    let details = LineageDetails {
        sql_query: sql,
        pipeline,
        ..Default::default()
    };
    let mut edge = Edge::new(from_entity.id, to_entity.id).with_details(details);
    edge.description = description;

    match store.add_lineage(&edge) {
        Ok(()) => {
            println!("Added lineage '{}' -> '{}'", from, to);
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn cmd_lineage_remove(store: &SqliteStore, from: &str, to: &str) -> i32 {
    let endpoints = resolve(store, from).and_then(|f| resolve(store, to).map(|t| (f, t)));
    let (from_entity, to_entity) = match endpoints {
        Ok(pair) => pair,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    match store.delete_lineage(&from_entity.id, &to_entity.id) {
        Ok(true) => {
            println!("Removed lineage '{}' -> '{}'", from, to);
            0
        }
        Ok(false) => {
            eprintln!("Warning: no lineage from '{}' to '{}'", from, to);
            1
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn cmd_lineage_show(store: &SqliteStore, locator: &str, depth: LineageDepth) -> i32 {
    let lineage = resolve(store, locator).and_then(|entity| store.get_lineage(&entity, depth).map_err(|e| e.to_string()));
    match lineage {
        Ok(lineage) => print_json(&lineage),
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn cmd_explore(store: Arc<SqliteStore>, config: &TributaryConfig, locator: &str, expansions: &[String], policy: MergePolicy) -> i32 {
    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };

    runtime.block_on(async {
        let focal = match resolve(&store, locator) {
            Ok(entity) => entity,
            Err(e) => {
                eprintln!("Error: {}", e);
                return 1;
            }
        };
        let source = StoreSource::new(Arc::clone(&store));
        let session = match LineageSession::load(&focal, &source, config.default_depth, policy).await {
            Ok(session) => session,
            Err(e) => {
                eprintln!("Error: {}", e);
                return 1;
            }
        };

        let mut code = 0;
        let mut outcomes = Vec::new();
        for spec in expansions {
            let target = parse_expansion(spec).and_then(|(node, direction)| Ok((resolve(&store, node)?, direction)));
            let (node, direction) = match target {
                Ok(target) => target,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    code = 1;
                    continue;
                }
            };
            match session.expand(&node, direction, &source).await {
                Ok(outcome) => outcomes.push(json!({
                    "node": outcome.node,
                    "direction": outcome.direction,
                    "nodesAdded": outcome.nodes_added,
                    "edgesAdded": outcome.edges_added,
                    "leaf": outcome.leaf,
                })),
                Err(e) => {
                    eprintln!("Error: expanding '{}': {}", spec, e);
                    code = 1;
                }
            }
        }

        let report = json!({
            "lineage": session.lineage().as_ref(),
            "leafNodes": session.leaves().as_ref(),
            "expansions": outcomes,
        });
        match print_json(&report) {
            0 => code,
            failed => failed,
        }
    })
}

fn main() {
    let cli = Cli::parse();
    let config = match TributaryConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    init_logging(&config);

    let db_path = cli.db.clone().unwrap_or_else(|| config.database_path());
    let store = match open_store(&db_path) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let code = match cli.command {
        Commands::Entity { action } => match action {
            EntityAction::Add { entity, id, display_name } => cmd_entity_add(&store, &entity, id, display_name),
            EntityAction::List => cmd_entity_list(&store),
            EntityAction::Remove { entity } => cmd_entity_remove(&store, &entity),
        },
        Commands::Lineage { action } => match action {
            LineageAction::Add { from, to, pipeline, sql, description } => {
                cmd_lineage_add(&store, &from, &to, pipeline.as_deref(), sql, description)
            }
            LineageAction::Remove { from, to } => cmd_lineage_remove(&store, &from, &to),
            LineageAction::Show { entity, upstream_depth, downstream_depth } => {
                let depth = LineageDepth::new(
                    upstream_depth.unwrap_or(config.default_depth.upstream),
                    downstream_depth.unwrap_or(config.default_depth.downstream),
                );
                cmd_lineage_show(&store, &entity, depth)
            }
        },
        Commands::Explore { entity, expansions, dedupe } => {
            let policy = if dedupe { MergePolicy::Deduplicate } else { config.merge_policy };
            cmd_explore(Arc::new(store), &config, &entity, &expansions, policy)
        }
    };
    std::process::exit(code);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locator_splits_on_first_colon() {
        assert_eq!(parse_locator("table:svc.db:weird.orders"), Ok(("table", "svc.db:weird.orders")));
        assert!(parse_locator("orders").is_err());
        assert!(parse_locator(":orders").is_err());
    }

    #[test]
    fn registering_twice_is_refused() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert_eq!(ensure_unregistered(&store, "table", "shop.orders"), Ok(()));

        store.save_entity(&EntityReference::with_id("o", "table", "shop.orders")).unwrap();
        let err = ensure_unregistered(&store, "table", "shop.orders").unwrap_err();
        assert!(err.contains("already exists"));
    }

    #[test]
    fn lookup_failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lineage.db");
        let store = SqliteStore::open(&path).unwrap();
        rusqlite::Connection::open(&path)
            .unwrap()
            .execute(
                "INSERT INTO entities (id, entity_type, fqn, reference_json) VALUES ('o', 'table', 'shop.orders', 'not json')",
                [],
            )
            .unwrap();

        let err = ensure_unregistered(&store, "table", "shop.orders").unwrap_err();
        assert!(!err.contains("already exists"));
    }

    #[test]
    fn expansion_needs_a_direction() {
        assert_eq!(
            parse_expansion("table:svc.db.s.orders@to"),
            Ok(("table:svc.db.s.orders", LineageDirection::Downstream))
        );
        assert!(parse_expansion("table:svc.db.s.orders").is_err());
        assert!(parse_expansion("table:svc.db.s.orders@sideways").is_err());
    }
}
