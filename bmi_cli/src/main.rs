use bmi_core::*;
use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "bmi")]
#[command(about = "Body mass index calculator with local history", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Calculate BMI and record it in history
    Calc {
        /// Age in years
        #[arg(long)]
        age: String,

        /// Weight in kg (or lbs with --imperial)
        #[arg(long)]
        weight: String,

        /// Height in cm (or inches with --imperial)
        #[arg(long)]
        height: String,

        /// Age category (infant, child, adult)
        #[arg(long)]
        age_category: Option<String>,

        /// Gender (male, female)
        #[arg(long)]
        gender: Option<String>,

        /// Use pounds and inches
        #[arg(long, conflicts_with = "metric")]
        imperial: bool,

        /// Use kilograms and centimetres
        #[arg(long)]
        metric: bool,

        /// Show the result without recording it
        #[arg(long)]
        no_save: bool,
    },

    /// List past calculations, newest first
    History,

    /// Show a past calculation by its timestamp
    Show {
        timestamp: String,
    },

    /// Erase all past calculations
    Clear {
        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    bmi_core::logging::init();

    let cli = Cli::parse();

    let config = Config::load()?;
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    let history = HistoryStore::open(data_dir, config.history.storage_key.clone());

    match cli.command {
        Commands::Calc {
            age,
            weight,
            height,
            age_category,
            gender,
            imperial,
            metric,
            no_save,
        } => {
            let form = CalcForm {
                age,
                weight,
                height,
                age_category,
                gender,
                imperial,
                metric,
            };
            cmd_calc(&history, form, no_save, &config)
        }
        Commands::History => cmd_history(&history),
        Commands::Show { timestamp } => cmd_show(&history, &timestamp),
        Commands::Clear { yes } => cmd_clear(&history, yes),
    }
}

/// Raw calculator arguments before validation
struct CalcForm {
    age: String,
    weight: String,
    height: String,
    age_category: Option<String>,
    gender: Option<String>,
    imperial: bool,
    metric: bool,
}

impl CalcForm {
    fn into_input(self, config: &Config) -> Result<CalculationInput> {
        let age = parse_measurement("age", &self.age)?;
        let weight = parse_measurement("weight", &self.weight)?;
        let height = parse_measurement("height", &self.height)?;
        validate_input(age, weight, height)?;

        let age_category = self
            .age_category
            .as_deref()
            .map(AgeCategory::from_name)
            .unwrap_or(config.defaults.age_category);
        let gender = match self.gender {
            Some(g) => g.parse::<Gender>()?,
            None => config.defaults.gender,
        };
        let use_metric = if self.imperial {
            false
        } else if self.metric {
            true
        } else {
            config.defaults.use_metric
        };

        Ok(CalculationInput {
            age,
            weight,
            height,
            age_category,
            gender,
            use_metric,
        })
    }
}

fn cmd_calc(
    history: &HistoryStore<FileStore>,
    form: CalcForm,
    no_save: bool,
    config: &Config,
) -> Result<()> {
    let input = form.into_input(config)?;
    let result = calculate(&input);

    display_result(&result);

    if no_save {
        println!("[Not saved to history]");
        return Ok(());
    }

    // History is best effort; the result has already been shown
    match history.append(&result) {
        Ok(()) => println!("✓ Saved to history ({})", result.timestamp()),
        Err(e) => {
            tracing::warn!("Failed to save calculation: {}", e);
            eprintln!("Warning: calculation was not saved to history");
        }
    }

    Ok(())
}

fn cmd_history(history: &HistoryStore<FileStore>) -> Result<()> {
    let records = history.recent();

    if records.is_empty() {
        println!("No calculations yet.");
        println!("Your BMI calculation history will appear here.");
        return Ok(());
    }

    println!("{} calculation(s), newest first:\n", records.len());
    for record in &records {
        display_history_item(record);
    }

    Ok(())
}

fn cmd_show(history: &HistoryStore<FileStore>, timestamp: &str) -> Result<()> {
    match history.find(timestamp) {
        Some(result) => {
            display_result(&result);
            Ok(())
        }
        None => Err(Error::Other(format!(
            "no calculation recorded at {}",
            timestamp
        ))),
    }
}

fn cmd_clear(history: &HistoryStore<FileStore>, yes: bool) -> Result<()> {
    if !yes && !confirm("Are you sure you want to clear all calculation history?")? {
        println!("History kept.");
        return Ok(());
    }

    history.clear()?;
    println!("✓ History cleared");
    Ok(())
}

fn age_category_title(age_category: AgeCategory) -> &'static str {
    match age_category {
        AgeCategory::Infant => "Infant",
        AgeCategory::Child => "Child",
        AgeCategory::Adult => "Adult",
    }
}

fn gender_title(gender: Gender) -> &'static str {
    match gender {
        Gender::Male => "Male",
        Gender::Female => "Female",
    }
}

fn display_result(result: &BmiResult) {
    println!("\n╭─────────────────────────────────────────╮");
    println!("│  YOUR BMI RESULT");
    println!("╰─────────────────────────────────────────╯");
    println!();
    println!("  {:.1} kg/m²  {}", result.bmi(), result.category());
    println!();
    println!(
        "  {}, {} years, {}",
        result.age_category().label(),
        result.age(),
        gender_title(result.gender())
    );
    println!(
        "  {} {}, {} {}",
        result.weight(),
        result.weight_unit(),
        result.height(),
        result.height_unit()
    );
    println!();

    println!(
        "  BMI Scale ({})",
        age_category_title(result.age_category())
    );
    for band in scale_bands(result.age_category()) {
        let marker = if band.category == result.category() {
            "→"
        } else {
            " "
        };
        println!("  {} {:<14} {}", marker, band.category.label(), band.range_text);
    }

    const WIDTH: usize = 40;
    let position = scale_position(result.bmi(), result.age_category());
    let at = ((position / 100.0) * (WIDTH - 1) as f64).round() as usize;
    let bar: String = (0..WIDTH)
        .map(|i| if i == at { '▲' } else { '─' })
        .collect();
    println!("  {}", bar);
    println!();
}

fn display_history_item(result: &BmiResult) {
    let date = result
        .recorded_at()
        .map(|at| at.with_timezone(&chrono::Local).format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| result.timestamp().to_string());

    println!("  {}  {:>5.1}  {}", date, result.bmi(), result.category());
    println!(
        "    {}, {} years, {}",
        age_category_title(result.age_category()),
        result.age(),
        gender_title(result.gender())
    );
    println!(
        "    {} {}, {} {}",
        result.weight(),
        result.weight_unit(),
        result.height(),
        result.height_unit()
    );
    println!("    id: {}", result.timestamp());
    println!();
}

fn confirm(question: &str) -> Result<bool> {
    print!("{} [y/N] ", question);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    Ok(matches!(input.trim().to_lowercase().as_str(), "y" | "yes"))
}
