//! Command handlers

use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use chrono::Utc;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

use iptu_app::export::{export_to_csv, export_to_excel, export_to_json};
use iptu_app::{analyze_property, get_history, get_stats, open_record_repo, AnalysisOptions, Config};
use iptu_domain::repository::AnalysisRecordRepository;
use iptu_domain::sample_properties;
use iptu_infra::load_properties_from_csv;
use iptu_types::{
    AnalysisRecord, BatchResults, Error, OutputFormat, PropertyInput, Result, Status,
};

use crate::cli::{Cli, Commands};
use crate::output::{output_record, output_stats, print_records_table};

/// Execute CLI command
pub fn execute(cli: Cli) -> Result<()> {
    // Load config
    let mut config = Config::load()?;

    // Override from CLI args
    if let Some(tolerance) = cli.tolerance {
        config.tolerance_percent = tolerance;
    }
    let output_format = cli.format.unwrap_or(config.output_format);

    match &cli.command {
        Commands::Analyze {
            address,
            area,
            owner,
            notes,
            dry_run,
        } => {
            let input = PropertyInput {
                address: address.clone(),
                registered_area: *area,
                owner: owner.clone(),
            };
            cmd_analyze(&cli, &config, input, notes.clone(), *dry_run, output_format)
        }

        Commands::Batch {
            csv,
            sample,
            output,
            jobs,
        } => {
            // Use CLI jobs if specified, otherwise default 4. 0 = auto CPU count.
            let job_count = match jobs {
                Some(0) => num_cpus::get(),
                Some(n) => *n,
                None => 4,
            };
            cmd_batch(
                &cli,
                &config,
                csv.clone(),
                *sample,
                output.clone(),
                job_count,
                output_format,
            )
        }

        Commands::History { status, limit } => {
            cmd_history(&config, status.as_deref(), *limit, output_format)
        }

        Commands::Stats => cmd_stats(&config, output_format),

        Commands::Export { output, status } => cmd_export(&config, output.clone(), status.as_deref()),

        Commands::Config {
            show,
            set_google_key,
            set_ee_project,
            set_ee_token,
            set_zoom,
            set_tolerance,
            set_output,
            set_detector_cmd,
            set_segmenter_cmd,
            set_save_images,
            reset,
        } => cmd_config(ConfigUpdates {
            show: *show,
            set_google_key: set_google_key.clone(),
            set_ee_project: set_ee_project.clone(),
            set_ee_token: set_ee_token.clone(),
            set_zoom: *set_zoom,
            set_tolerance: *set_tolerance,
            set_output: *set_output,
            set_detector_cmd: set_detector_cmd.clone(),
            set_segmenter_cmd: set_segmenter_cmd.clone(),
            set_save_images: *set_save_images,
            reset: *reset,
        }),

        Commands::Clear { yes } => cmd_clear(&config, *yes),
    }
}

fn cmd_analyze(
    cli: &Cli,
    config: &Config,
    input: PropertyInput,
    notes: Option<String>,
    dry_run: bool,
    output_format: OutputFormat,
) -> Result<()> {
    let mut options = AnalysisOptions::new().with_dry_run(dry_run);
    if let Some(notes) = notes {
        options = options.with_notes(notes);
    }

    let callback = if cli.verbose {
        Some(Box::new(|msg: &str| eprintln!("{}", msg)) as Box<dyn Fn(&str) + Send>)
    } else {
        None
    };

    let record = analyze_property(&input, config, &options, callback).map_err(Error::from)?;

    output_record(output_format, &record)?;

    if record.status == Status::Underdeclared {
        eprintln!(
            "\nALERT: measured area exceeds the declared area by {:.2}% - potential underdeclaration",
            record.percent_difference
        );
    }

    Ok(())
}

/// Result from a single analysis task
#[derive(Debug)]
struct AnalysisTaskResult {
    address: String,
    result: std::result::Result<AnalysisRecord, String>,
}

fn cmd_batch(
    cli: &Cli,
    config: &Config,
    csv: Option<PathBuf>,
    sample: bool,
    output: Option<PathBuf>,
    jobs: usize,
    output_format: OutputFormat,
) -> Result<()> {
    // Load input set
    let properties: Vec<PropertyInput> = if sample {
        sample_properties().into_iter().map(Into::into).collect()
    } else {
        let path = csv.ok_or_else(|| {
            Error::CsvLoader("no CSV file given (or use --sample)".to_string())
        })?;
        load_properties_from_csv(&path).map_err(|e| Error::CsvLoader(e.to_string()))?
    };

    if properties.is_empty() {
        return Err(Error::CsvLoader("no properties to analyze".to_string()));
    }

    let total = properties.len();
    if cli.verbose {
        eprintln!(
            "Analyzing {} properties with {} parallel jobs",
            total, jobs
        );
    }

    // Setup progress bar
    let multi_progress = MultiProgress::new();
    let main_pb = multi_progress.add(ProgressBar::new(total as u64));
    main_pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );

    // Shared state
    let results: Arc<Mutex<Vec<AnalysisTaskResult>>> = Arc::new(Mutex::new(Vec::new()));
    let properties = Arc::new(properties);
    let next_index = Arc::new(AtomicUsize::new(0));

    let started_at = Utc::now();
    let verbose = cli.verbose;

    // Spawn worker threads. Workers run dry (no store writes); records are
    // appended on the main thread after the join so the store file is only
    // touched by one writer.
    let mut handles = Vec::new();
    for worker_id in 0..jobs {
        let properties = Arc::clone(&properties);
        let next_index = Arc::clone(&next_index);
        let results = Arc::clone(&results);
        let config = config.clone();
        let pb = main_pb.clone();

        let handle = thread::spawn(move || {
            let options = AnalysisOptions::new().with_dry_run(true);

            loop {
                let idx = next_index.fetch_add(1, Ordering::SeqCst);
                if idx >= properties.len() {
                    break;
                }

                let property = &properties[idx];
                if verbose {
                    pb.set_message(format!("[W{}] {}", worker_id, property.address));
                }

                let result = analyze_property(property, &config, &options, None)
                    .map_err(|e| e.to_string());

                {
                    let mut results_guard = results.lock().unwrap();
                    results_guard.push(AnalysisTaskResult {
                        address: property.address.clone(),
                        result,
                    });
                }

                pb.inc(1);
            }
        });

        handles.push(handle);
    }

    for handle in handles {
        let _ = handle.join();
    }

    main_pb.finish_with_message("Complete");

    let completed_at = Utc::now();

    let task_results = Arc::try_unwrap(results)
        .expect("All workers should be done")
        .into_inner()
        .unwrap();

    // Collect and persist
    let mut records = Vec::new();
    let mut successful = 0;
    let mut failed = 0;

    for task_result in task_results {
        match task_result.result {
            Ok(record) => {
                records.push(record);
                successful += 1;
            }
            Err(e) => {
                if cli.verbose {
                    eprintln!("Failed to analyze {}: {}", task_result.address, e);
                }
                failed += 1;
            }
        }
    }

    // Stable output order regardless of worker scheduling
    records.sort_by(|a, b| a.address.cmp(&b.address));

    let mut repo = open_record_repo(config)?;
    for record in &records {
        repo.append(record.clone())?;
    }

    let results = BatchResults {
        records,
        total_processed: total,
        successful,
        failed,
        started_at,
        completed_at,
    };

    let flagged: Vec<&AnalysisRecord> = results
        .records
        .iter()
        .filter(|r| r.status == Status::Underdeclared)
        .collect();

    // Output results
    if let Some(output_path) = output {
        let content = serde_json::to_string_pretty(&results)?;
        std::fs::write(&output_path, content)?;
        println!("Results saved to: {}", output_path.display());
    } else {
        println!("\nBatch Analysis Complete");
        println!("=======================");
        println!("Total:          {}", results.total_processed);
        println!("Successful:     {}", results.successful);
        println!("Failed:         {}", results.failed);
        println!("Underdeclared:  {}", flagged.len());
        println!(
            "Duration:       {:.1}s",
            (results.completed_at - results.started_at).num_milliseconds() as f64 / 1000.0
        );

        for record in &flagged {
            println!(
                "  ALERT: {} measured {:.2} m² vs declared {:.2} m² (+{:.2}%)",
                record.address,
                record.measured_area,
                record.registered_area,
                record.percent_difference
            );
        }

        if output_format == OutputFormat::Json {
            let content = serde_json::to_string_pretty(&results)?;
            println!("\n{}", content);
        }
    }

    Ok(())
}

fn cmd_history(
    config: &Config,
    status: Option<&str>,
    limit: usize,
    output_format: OutputFormat,
) -> Result<()> {
    let status_filter = match status {
        Some(s) => Some(
            Status::parse(s)
                .ok_or_else(|| Error::Store(format!("unknown status filter: {}", s)))?,
        ),
        None => None,
    };

    let records = get_history(config, status_filter, Some(limit))
        .map_err(|e| Error::Store(e.to_string()))?;

    if output_format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&records)?);
    } else if records.is_empty() {
        println!("No records found");
    } else {
        print_records_table(&records);
    }

    Ok(())
}

fn cmd_stats(config: &Config, output_format: OutputFormat) -> Result<()> {
    let stats = get_stats(config).map_err(|e| Error::Store(e.to_string()))?;
    output_stats(output_format, &stats)
}

fn cmd_export(config: &Config, output: PathBuf, status: Option<&str>) -> Result<()> {
    let status_filter = match status {
        Some(s) => Some(
            Status::parse(s)
                .ok_or_else(|| Error::Store(format!("unknown status filter: {}", s)))?,
        ),
        None => None,
    };

    let records =
        get_history(config, status_filter, None).map_err(|e| Error::Store(e.to_string()))?;

    if records.is_empty() {
        return Err(Error::Store("no records to export".to_string()));
    }

    let extension = output
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("xlsx")
        .to_lowercase();

    match extension.as_str() {
        "xlsx" => export_to_excel(&records, &output)?,
        "csv" => export_to_csv(&records, &output)?,
        "json" => export_to_json(&records, &output)?,
        other => {
            return Err(Error::Excel(format!(
                "unsupported export format: .{} (expected .xlsx, .csv or .json)",
                other
            )))
        }
    }

    println!("Exported {} records to: {}", records.len(), output.display());
    Ok(())
}

struct ConfigUpdates {
    show: bool,
    set_google_key: Option<String>,
    set_ee_project: Option<String>,
    set_ee_token: Option<String>,
    set_zoom: Option<u32>,
    set_tolerance: Option<f64>,
    set_output: Option<OutputFormat>,
    set_detector_cmd: Option<String>,
    set_segmenter_cmd: Option<String>,
    set_save_images: Option<bool>,
    reset: bool,
}

fn cmd_config(updates: ConfigUpdates) -> Result<()> {
    if updates.reset {
        let config = Config::default();
        config.save()?;
        println!("Configuration reset to defaults");
        println!("\n{}", config);
        return Ok(());
    }

    let mut config = Config::load()?;
    let mut modified = false;

    if let Some(key) = updates.set_google_key {
        config.google_api_key = Some(key);
        modified = true;
    }

    if let Some(project) = updates.set_ee_project {
        config.ee_project = Some(project);
        modified = true;
    }

    if let Some(token) = updates.set_ee_token {
        config.ee_token = Some(token);
        modified = true;
    }

    if let Some(zoom) = updates.set_zoom {
        config.zoom = zoom;
        modified = true;
    }

    if let Some(tolerance) = updates.set_tolerance {
        config.tolerance_percent = tolerance;
        modified = true;
    }

    if let Some(output_format) = updates.set_output {
        config.output_format = output_format;
        modified = true;
    }

    if let Some(cmd) = updates.set_detector_cmd {
        config.detector_command = Some(cmd);
        modified = true;
    }

    if let Some(cmd) = updates.set_segmenter_cmd {
        config.segmenter_command = Some(cmd);
        modified = true;
    }

    if let Some(save_images) = updates.set_save_images {
        config.save_images = save_images;
        modified = true;
    }

    if modified {
        config.save()?;
        println!("Configuration updated");
    }

    if updates.show || !modified {
        println!("{}", config);
    }

    Ok(())
}

fn cmd_clear(config: &Config, yes: bool) -> Result<()> {
    let mut repo = open_record_repo(config)?;
    let count = repo.count();

    if count == 0 {
        println!("Store is already empty");
        return Ok(());
    }

    if !yes {
        print!("Remove all {} stored records? [y/N] ", count);
        std::io::stdout().flush()?;

        let mut answer = String::new();
        std::io::stdin().read_line(&mut answer)?;
        if !matches!(answer.trim().to_lowercase().as_str(), "y" | "yes") {
            println!("Aborted");
            return Ok(());
        }
    }

    let removed = repo.clear()?;
    println!("Removed {} records", removed);
    Ok(())
}
