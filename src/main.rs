use anyhow::Result;
use chrono::Utc;
use clap::Parser;
use tracing::{error, info};

mod cli;

use cli::{Cli, Commands};
use dictadmin::api::{export, DictDataApi, HttpApi};
use dictadmin::config::Config;
use dictadmin::models::{ListFilter, ListQuery, RecordPatch};
use dictadmin::tui;

#[tokio::main]
async fn main() -> Result<()> {
    // Set default log level to INFO if not specified
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "dictadmin=info");
    }

    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Tui { dict_type: None });

    // The TUI owns the terminal, so console logging must stay off there
    init_logging(matches!(command, Commands::Tui { .. }));

    let config = Config::from_env()?;
    config.validate()?;

    match command {
        Commands::Tui { dict_type } => {
            info!("Launching dictionary data admin screen");

            match tui::run_tui(config, dict_type).await {
                Ok(_) => info!("TUI exited successfully"),
                Err(e) => {
                    error!("TUI failed: {}", e);
                    std::process::exit(1);
                }
            }
        }

        Commands::List {
            dict_type,
            label,
            value,
            from_date,
            to_date,
            page,
            size,
        } => {
            let api = HttpApi::new(&config)?;
            let query = ListQuery {
                page_num: page,
                page_size: size.unwrap_or(config.page_size),
                filter: ListFilter {
                    dict_type,
                    dict_label: label,
                    dict_value: value,
                    created_from: from_date,
                    created_to: to_date,
                },
            };

            match api.list(&query).await {
                Ok(page) => {
                    println!(
                        "{:<8} {:<20} {:<20} {:<12} {:>6} {:<20}",
                        "Code", "Type", "Label", "Value", "Sort", "Created"
                    );
                    for record in &page.rows {
                        println!(
                            "{:<8} {:<20} {:<20} {:<12} {:>6} {:<20}",
                            record
                                .dict_code
                                .map(|c| c.to_string())
                                .unwrap_or_default(),
                            record.dict_type,
                            record.dict_label,
                            record.dict_value,
                            record.dict_sort,
                            record.create_time.as_deref().unwrap_or("-")
                        );
                    }
                    println!(
                        "Page {} of {} records ({} shown)",
                        query.page_num,
                        page.total,
                        page.rows.len()
                    );
                }
                Err(e) => {
                    error!("List failed: {}", e);
                    std::process::exit(1);
                }
            }
        }

        Commands::Get { code } => {
            let api = HttpApi::new(&config)?;
            match api.get(code).await {
                Ok(record) => println!("{}", serde_json::to_string_pretty(&record)?),
                Err(e) => {
                    error!("Get failed: {}", e);
                    std::process::exit(1);
                }
            }
        }

        Commands::Add {
            dict_type,
            label,
            value,
            sort,
            remark,
        } => {
            let api = HttpApi::new(&config)?;
            let record = RecordPatch {
                dict_type: Some(dict_type),
                dict_label: Some(label),
                dict_value: Some(value),
                dict_sort: Some(sort),
                remark,
            }
            .into_record();

            match api.create(&record).await {
                Ok(created) => info!(
                    "Created dictionary data '{}' (code {})",
                    created.dict_label,
                    created
                        .dict_code
                        .map(|c| c.to_string())
                        .unwrap_or_else(|| "unknown".to_string())
                ),
                Err(e) => {
                    error!("Create failed: {}", e);
                    std::process::exit(1);
                }
            }
        }

        Commands::Update {
            code,
            dict_type,
            label,
            value,
            sort,
            remark,
        } => {
            let api = HttpApi::new(&config)?;
            let patch = RecordPatch {
                dict_type,
                dict_label: label,
                dict_value: value,
                dict_sort: sort,
                remark,
            };

            // Load the current record so untouched fields carry over
            let result = match api.get(code).await {
                Ok(current) => api.update(&patch.merge_into(&current)).await,
                Err(e) => Err(e),
            };

            match result {
                Ok(updated) => info!("Updated dictionary data '{}'", updated.dict_label),
                Err(e) => {
                    error!("Update failed: {}", e);
                    std::process::exit(1);
                }
            }
        }

        Commands::Delete { codes, yes } => {
            let codes = Commands::parse_codes(&codes)?;
            if !yes {
                let joined = codes
                    .iter()
                    .map(|c| c.to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                eprintln!(
                    "Refusing to delete dictionary data with code(s) \"{}\" without --yes",
                    joined
                );
                std::process::exit(1);
            }

            let api = HttpApi::new(&config)?;
            match api.delete(&codes).await {
                Ok(_) => info!("Deleted {} record(s)", codes.len()),
                Err(e) => {
                    error!("Delete failed: {}", e);
                    std::process::exit(1);
                }
            }
        }

        Commands::Export {
            dict_type,
            label,
            value,
            from_date,
            to_date,
        } => {
            let api = HttpApi::new(&config)?;
            let filter = ListFilter {
                dict_type,
                dict_label: label,
                dict_value: value,
                created_from: from_date,
                created_to: to_date,
            };

            let result = match api.export(&filter).await {
                Ok(bytes) => export::save_export(
                    &config.download_dir,
                    &export::export_filename(Utc::now()),
                    &bytes,
                ),
                Err(e) => Err(e),
            };

            match result {
                Ok(path) => println!("Exported to {}", path.display()),
                Err(e) => {
                    error!("Export failed: {}", e);
                    std::process::exit(1);
                }
            }
        }

        Commands::RefreshCache => {
            let api = HttpApi::new(&config)?;
            match api.refresh_cache().await {
                Ok(_) => info!("Dictionary cache refreshed"),
                Err(e) => {
                    error!("Cache refresh failed: {}", e);
                    std::process::exit(1);
                }
            }
        }

        Commands::Types => {
            let api = HttpApi::new(&config)?;
            match api.list_types().await {
                Ok(types) => {
                    println!("{:<30} {}", "Type", "Name");
                    for t in &types {
                        println!("{:<30} {}", t.dict_type, t.dict_name);
                    }
                }
                Err(e) => {
                    error!("Type listing failed: {}", e);
                    std::process::exit(1);
                }
            }
        }
    }

    Ok(())
}

/// Log to stderr and a file, or the file alone while the TUI has the
/// terminal
fn init_logging(file_only: bool) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

    let file_appender = tracing_appender::rolling::never(".", "dictadmin.log");
    let file_layer = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false)
        .with_filter(EnvFilter::from_default_env());

    if file_only {
        tracing_subscriber::registry().with(file_layer).init();
    } else {
        tracing_subscriber::registry()
            .with(file_layer)
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_filter(EnvFilter::from_default_env()),
            )
            .init();
    }
}
