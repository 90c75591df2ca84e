use std::sync::Arc;

use clap::Subcommand;
use waypoint_core::store::{FileStore, StoreCompletionFlags};
use waypoint_core::{catalog, AnswerValue, CoreError, RatedItem, Result, SurveyWizard};

#[derive(Subcommand)]
pub enum SurveyAction {
    /// List available surveys
    List,
    /// Print a survey definition as JSON
    Show {
        /// Survey id (e.g. "career-survey")
        survey: String,
    },
    /// Print session progress as JSON
    Status {
        /// Survey id
        survey: String,
    },
    /// Answer the upfront branch question
    Branch {
        /// Survey id
        survey: String,
        /// Option key of the chosen branch
        choice: String,
    },
    /// Record an answer for a question on the current step
    Answer {
        /// Survey id
        survey: String,
        /// Question id
        question: String,
        /// Single-choice option key
        #[arg(long, group = "value")]
        choice: Option<String>,
        /// Free-text answer
        #[arg(long, group = "value")]
        text: Option<String>,
        /// Checkbox selection; repeat for multiple keys
        #[arg(long, group = "value")]
        select: Vec<String>,
        /// Ranked selection in order; repeat for each rank
        #[arg(long, group = "value")]
        rank: Vec<String>,
        /// Rated item as item=rating; repeat for multiple items
        #[arg(long, group = "value")]
        rate: Vec<String>,
    },
    /// Advance to the next step (validates the current one)
    Next {
        /// Survey id
        survey: String,
    },
    /// Go back one step
    Back {
        /// Survey id
        survey: String,
    },
    /// Submit the final step and run the analysis
    Submit {
        /// Survey id
        survey: String,
    },
    /// Print the stored result as JSON
    Result {
        /// Survey id
        survey: String,
    },
    /// Discard all progress and results for a survey
    Reset {
        /// Survey id
        survey: String,
    },
}

fn open_wizard(survey_id: &str) -> Result<SurveyWizard> {
    let definition = catalog::by_id(survey_id)
        .ok_or_else(|| CoreError::Custom(format!("unknown survey: {survey_id}")))?;
    let store = Arc::new(FileStore::open_default()?);
    let flags = Arc::new(StoreCompletionFlags::new(store.clone()));
    Ok(SurveyWizard::resume_or_new(definition, store, flags))
}

fn parse_rated(entries: &[String]) -> Result<Vec<RatedItem>> {
    entries
        .iter()
        .map(|entry| {
            let (item, rating) = entry
                .split_once('=')
                .ok_or_else(|| CoreError::Custom(format!("expected item=rating, got: {entry}")))?;
            Ok(RatedItem {
                item: item.to_string(),
                rating: rating
                    .parse::<u8>()
                    .map_err(|_| CoreError::Custom(format!("bad rating in: {entry}")))?,
            })
        })
        .collect()
}

fn print_status(wizard: &SurveyWizard) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&wizard.progress_report())?);
    Ok(())
}

pub async fn run(action: SurveyAction) -> Result<()> {
    match action {
        SurveyAction::List => {
            for def in catalog::all() {
                println!("{}\t{}\t{} questions", def.id, def.title, def.question_count());
            }
        }
        SurveyAction::Show { survey } => {
            let definition = catalog::by_id(&survey)
                .ok_or_else(|| CoreError::Custom(format!("unknown survey: {survey}")))?;
            println!("{}", serde_json::to_string_pretty(&definition)?);
        }
        SurveyAction::Status { survey } => {
            let wizard = open_wizard(&survey)?;
            print_status(&wizard)?;
        }
        SurveyAction::Branch { survey, choice } => {
            let mut wizard = open_wizard(&survey)?;
            wizard.choose_branch(&choice)?;
            print_status(&wizard)?;
        }
        SurveyAction::Answer { survey, question, choice, text, select, rank, rate } => {
            let value = if let Some(key) = choice {
                AnswerValue::Choice(key)
            } else if let Some(text) = text {
                AnswerValue::Text(text)
            } else if !select.is_empty() {
                AnswerValue::Selections(select)
            } else if !rank.is_empty() {
                AnswerValue::Ranked(rank)
            } else if !rate.is_empty() {
                AnswerValue::Rated(parse_rated(&rate)?)
            } else {
                return Err(CoreError::Custom(
                    "no answer value given; use --choice, --text, --select, --rank or --rate"
                        .to_string(),
                ));
            };
            let mut wizard = open_wizard(&survey)?;
            wizard.set_answer(&question, value)?;
            print_status(&wizard)?;
        }
        SurveyAction::Next { survey } => {
            let mut wizard = open_wizard(&survey)?;
            wizard.advance()?;
            print_status(&wizard)?;
        }
        SurveyAction::Back { survey } => {
            let mut wizard = open_wizard(&survey)?;
            wizard.retreat()?;
            print_status(&wizard)?;
        }
        SurveyAction::Submit { survey } => {
            let mut wizard = open_wizard(&survey)?;
            let result = wizard.submit().await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        SurveyAction::Result { survey } => {
            let wizard = open_wizard(&survey)?;
            match wizard.result() {
                Some(result) => {
                    let info = wizard.definition().scoring.describe(result.primary_archetype());
                    println!("{}", serde_json::to_string_pretty(&serde_json::json!({
                        "result": result,
                        "primary": info,
                    }))?);
                }
                None => {
                    eprintln!("no result stored for {survey}");
                    std::process::exit(1);
                }
            }
        }
        SurveyAction::Reset { survey } => {
            let mut wizard = open_wizard(&survey)?;
            wizard.reset();
            println!("{survey} reset");
        }
    }
    Ok(())
}
