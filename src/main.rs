use std::fs;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use felfel_diet::aggregate::{series_total, Period};
use felfel_diet::app::{DaySummary, DietApp, Page};
use felfel_diet::client::{media_type_for, GeminiLabelClient};
use felfel_diet::config::Config;
use felfel_diet::meal_log::parse_date;
use felfel_diet::models::{
    ActivityLevel, FoodType, MealCategory, NewMealItem, Nutrients, ProfileInput, UserProfile,
    WeightGoal,
};
use felfel_diet::store::FileStore;

#[derive(Parser)]
#[command(name = "felfel")]
#[command(about = "Track meals against a daily calorie target", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Directory holding the saved profile and meal logs (overrides FELFEL_DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Create, update or show the profile
    Profile {
        #[command(subcommand)]
        action: ProfileCommand,
    },
    /// Log an item by hand
    Add(AddArgs),
    /// Delete a logged item
    Delete(DeleteArgs),
    /// Show one day's totals and meals
    Day {
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,
    },
    /// Per-day totals for the week, month or year containing a date
    Stats {
        #[arg(long, default_value = "week")]
        period: Period,
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,
    },
    /// Photograph of a nutrition label → logged item
    Scan {
        image: PathBuf,
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,
        #[arg(long, default_value = "Breakfast")]
        category: MealCategory,
    },
}

#[derive(Subcommand)]
enum ProfileCommand {
    /// Save the profile; omitted fields keep their current values
    Set(ProfileArgs),
    Show,
}

#[derive(Args)]
struct ProfileArgs {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    age: Option<u32>,
    /// Height in cm
    #[arg(long)]
    height: Option<u32>,
    /// Weight in kg
    #[arg(long)]
    weight: Option<u32>,
    /// sedentary, lightly-active, moderately-active, very-active, extra-active
    #[arg(long)]
    activity: Option<ActivityLevel>,
    /// lose, maintain or gain
    #[arg(long)]
    goal: Option<WeightGoal>,
}

#[derive(Args)]
struct AddArgs {
    #[arg(long, value_parser = parse_date)]
    date: Option<NaiveDate>,
    #[arg(long)]
    category: MealCategory,
    #[arg(long)]
    name: String,
    #[arg(long = "type", default_value = "Unknown")]
    food_type: FoodType,
    #[arg(long, default_value_t = 0.0)]
    calories: f64,
    #[arg(long, default_value_t = 0.0)]
    carbs: f64,
    #[arg(long, default_value_t = 0.0)]
    protein: f64,
    #[arg(long, default_value_t = 0.0)]
    fat: f64,
    #[arg(long, default_value_t = 0.0)]
    sugar: f64,
}

#[derive(Args)]
struct DeleteArgs {
    #[arg(long, value_parser = parse_date)]
    date: NaiveDate,
    #[arg(long)]
    category: MealCategory,
    #[arg(long)]
    id: String,
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if cli.verbose { "debug" } else { "info" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_env().with_data_dir(cli.data_dir.clone());
    tracing::debug!(?config, "configuration loaded");

    let mut app = DietApp::load(FileStore::new(&config.data_dir))
        .with_context(|| format!("Failed to load data from {}", config.data_dir.display()))?;

    match cli.command {
        Commands::Profile { action } => match action {
            ProfileCommand::Set(args) => {
                let input = merge_profile(app.profile(), args)?;
                let profile = app.save_profile(input)?;
                print_profile(profile);
            }
            ProfileCommand::Show => match app.profile() {
                Some(profile) => print_profile(profile),
                None => println!("No profile yet. Create one with `felfel profile set`."),
            },
        },
        Commands::Add(args) => {
            let date = args.date.unwrap_or_else(today);
            let item = NewMealItem {
                name: args.name,
                food_type: args.food_type,
                nutrients: Nutrients {
                    calories: args.calories,
                    carbs: args.carbs,
                    protein: args.protein,
                    fat: args.fat,
                    sugar: args.sugar,
                },
            };
            let logged = app.add_item(date, args.category, item)?;
            println!("Logged {} ({}) on {} [{}]", logged.name, logged.id, date, args.category);
        }
        Commands::Delete(args) => {
            if app.delete_item(args.date, args.category, &args.id)? {
                println!("Deleted {}", args.id);
            } else {
                println!("No item {} under {} {}", args.id, args.date, args.category);
            }
        }
        Commands::Day { date } => {
            print_day(&app.dashboard(date.unwrap_or_else(today))?);
        }
        Commands::Stats { period, date } => {
            let series = app.stats(period, date.unwrap_or_else(today));
            for point in &series {
                let n = &point.nutrients;
                println!(
                    "{:<7} {:>6.0} kcal  P {:>4.0}g  C {:>4.0}g  F {:>4.0}g",
                    point.label, n.calories, n.protein, n.carbs, n.fat
                );
            }
            let total = series_total(&series);
            println!(
                "{} total: {:.0} kcal over {} days",
                period,
                total.calories,
                series.len()
            );
        }
        Commands::Scan {
            image,
            date,
            category,
        } => {
            require_profile(&app)?;
            let media_type = media_type_for(&image)
                .ok_or_else(|| anyhow!("Unsupported image type: {}", image.display()))?;
            let bytes =
                fs::read(&image).with_context(|| format!("Failed to read {}", image.display()))?;
            let recognizer = GeminiLabelClient::from_config(&config);

            let date = date.unwrap_or_else(today);
            let logged = app
                .scan_label(&recognizer, date, category, &bytes, media_type)
                .await?;
            let n = &logged.nutrients;
            println!(
                "Logged {} [{}] {:.0} kcal  P {:.1}g  C {:.1}g  F {:.1}g  S {:.1}g",
                logged.name, logged.food_type, n.calories, n.protein, n.carbs, n.fat, n.sugar
            );
        }
    }

    Ok(())
}

fn require_profile(app: &DietApp<FileStore>) -> Result<()> {
    match app.landing_page() {
        Page::Profile => Err(anyhow!(
            "No profile yet. Create one with `felfel profile set` first."
        )),
        _ => Ok(()),
    }
}

/// Start from the saved profile (or defaults) and apply the given flags.
fn merge_profile(existing: Option<&UserProfile>, args: ProfileArgs) -> Result<ProfileInput> {
    let mut input = existing.map(ProfileInput::from).unwrap_or_default();
    let complete = args.name.is_some()
        && args.age.is_some()
        && args.height.is_some()
        && args.weight.is_some();
    if existing.is_none() && !complete {
        return Err(anyhow!("A new profile needs --name, --age, --height and --weight"));
    }
    if let Some(name) = args.name {
        input.name = name;
    }
    if let Some(age) = args.age {
        input.age = age;
    }
    if let Some(height) = args.height {
        input.height = height;
    }
    if let Some(weight) = args.weight {
        input.weight = weight;
    }
    if let Some(activity) = args.activity {
        input.activity_level = activity;
    }
    if let Some(goal) = args.goal {
        input.weight_goal = goal;
    }
    Ok(input)
}

fn print_profile(profile: &UserProfile) {
    println!("{}", profile.name);
    println!(
        "  age {}  height {} cm  weight {} kg",
        profile.age, profile.height, profile.weight
    );
    println!(
        "  activity {} (x{})  goal {}",
        profile.activity_level,
        profile.activity_level.multiplier(),
        profile.weight_goal
    );
    println!("  target {} kcal/day", profile.target_calories);
}

fn print_day(summary: &DaySummary) {
    let c = &summary.consumed;
    println!("{}", summary.date);
    println!(
        "  target {} kcal  consumed {:.0} kcal  remaining {} kcal",
        summary.target_calories, c.calories, summary.remaining_calories
    );
    println!(
        "  carbs {:.0}g  protein {:.0}g  fat {:.0}g  sugar {:.0}g",
        c.carbs, c.protein, c.fat, c.sugar
    );
    for meal in &summary.meals {
        let t = &meal.totals;
        println!(
            "{}: {:.0} kcal · P {:.0}g · C {:.0}g · F {:.0}g",
            meal.category, t.calories, t.protein, t.carbs, t.fat
        );
        for item in &meal.items {
            let n = &item.nutrients;
            println!(
                "  {} [{}] {:.0} kcal  P {:.0}g C {:.0}g F {:.0}g S {:.0}g  id={}",
                item.name, item.food_type, n.calories, n.protein, n.carbs, n.fat, n.sugar, item.id
            );
        }
    }
}
