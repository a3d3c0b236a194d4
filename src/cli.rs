//! Command-line interface: thin argument handling over the library.

use std::error::Error;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::app_dirs;
use crate::dataset::{DiseaseDetail, ReferenceLibrary, TrainingTable};
use crate::engine::{DiagnosisEngine, EngineSources};
use crate::predict::SymptomQuery;
use crate::train_config;
use crate::training::{TrainReport, run_training};

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(
    name = "sympred",
    about = "Predict a disease from reported symptoms, or train the classifier."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Train the classifier and persist its artifacts
    Train(TrainArgs),
    /// Predict a disease from a comma-separated symptom list
    Predict(PredictArgs),
    /// Show description, precautions, and medications for a disease
    Details(DetailsArgs),
}

#[derive(Args, Debug)]
struct TrainArgs {
    /// Training table CSV
    #[arg(long, default_value = "data/Training_data.csv")]
    data: PathBuf,

    /// Where to write model and index artifacts; defaults to the app models dir
    #[arg(long)]
    models_dir: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ReferenceArgs {
    /// Disease description CSV
    #[arg(long, default_value = "data/description.csv")]
    descriptions: PathBuf,

    /// Disease precautions CSV
    #[arg(long, default_value = "data/precautions_df.csv")]
    precautions: PathBuf,

    /// Disease medications CSV
    #[arg(long, default_value = "data/medications.csv")]
    medications: PathBuf,
}

#[derive(Args, Debug)]
struct PredictArgs {
    /// Comma-separated symptoms, e.g. "itching, skin rash, fever"
    #[arg(long)]
    symptoms: String,

    /// Training table CSV
    #[arg(long, default_value = "data/Training_data.csv")]
    data: PathBuf,

    #[command(flatten)]
    references: ReferenceArgs,

    /// Where trained artifacts live; defaults to the app models dir
    #[arg(long)]
    models_dir: Option<PathBuf>,

    /// Skip the trained model and match against raw training rows
    #[arg(long)]
    heuristic: bool,
}

#[derive(Args, Debug)]
struct DetailsArgs {
    /// Disease label to look up
    #[arg(long)]
    disease: String,

    #[command(flatten)]
    references: ReferenceArgs,
}

impl Cli {
    /// Dispatch the parsed subcommand.
    pub fn run(self) -> Result<(), Box<dyn Error>> {
        match self.command {
            Commands::Train(args) => run_train(args),
            Commands::Predict(args) => run_predict(args),
            Commands::Details(args) => run_details(args),
        }
    }
}

fn run_train(args: TrainArgs) -> Result<(), Box<dyn Error>> {
    let table = TrainingTable::load(&args.data)?;
    let models_dir = resolve_models_dir(args.models_dir)?;
    let options = train_config::load_from_app_dir().unwrap_or_default().apply();
    let report = run_training(&table, &models_dir, &options)?;
    print_report(&report);
    println!("Artifacts saved to {}", models_dir.display());
    Ok(())
}

fn run_predict(args: PredictArgs) -> Result<(), Box<dyn Error>> {
    let models_dir = if args.heuristic {
        None
    } else {
        Some(resolve_models_dir(args.models_dir)?)
    };
    let sources = EngineSources {
        training: args.data,
        descriptions: args.references.descriptions,
        precautions: args.references.precautions,
        medications: args.references.medications,
        models_dir,
    };
    let engine = DiagnosisEngine::load(&sources)?;
    let query = SymptomQuery::parse(&args.symptoms);
    let diagnosis = engine.predict_query(&query)?;
    println!("Predicted disease: {}", diagnosis.disease);
    print_detail(&diagnosis.detail);
    Ok(())
}

fn run_details(args: DetailsArgs) -> Result<(), Box<dyn Error>> {
    let references = ReferenceLibrary::load(
        &args.references.descriptions,
        &args.references.precautions,
        &args.references.medications,
    )?;
    println!("Disease: {}", args.disease.trim());
    print_detail(&references.resolve(args.disease.trim()));
    Ok(())
}

fn resolve_models_dir(override_dir: Option<PathBuf>) -> Result<PathBuf, Box<dyn Error>> {
    match override_dir {
        Some(dir) => Ok(dir),
        None => Ok(app_dirs::models_dir()?),
    }
}

fn print_report(report: &TrainReport) {
    println!(
        "Trained on {} rows, evaluated on {} ({} symptoms, {} diseases)",
        report.n_train, report.n_test, report.n_symptoms, report.n_classes
    );
    println!("Accuracy: {:.2}%", report.summary.accuracy * 100.0);
    println!("Precision: {:.4}", report.summary.macro_precision);
    println!("Recall: {:.4}", report.summary.macro_recall);
}

fn print_detail(detail: &DiseaseDetail) {
    println!("Description: {}", detail.description);
    println!("Precautions:");
    for precaution in &detail.precautions {
        println!("  - {precaution}");
    }
    println!("Medications:");
    for medication in &detail.medications {
        println!("  - {medication}");
    }
}
