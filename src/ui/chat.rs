//! The conversational menu.
//!
//! A free-text request is parsed into a [`Command`]; each command maps to one
//! view renderer through [`Command::handler`]. Prompts go through a
//! [`Prompter`] so the same loop drives an interactive terminal and piped
//! input.

use std::io::{BufRead, Write};

use anyhow::Result;
use clap::ValueEnum;
use console::style;
use dialoguer::{Input, MultiSelect, theme::ColorfulTheme};
use thiserror::Error;
use tracing::debug;

use super::charts::ChartKind;
use super::views;
use crate::session::Session;

/// Dashboard sections reachable from the chat prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum Command {
    Overall,
    Payments,
    Customer,
    Charts,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unrecognized request '{0}'")]
pub struct UnknownCommand(pub String);

/// Renders one view from the session; only the charts view reads the selection.
pub type Handler = fn(&Session, &[ChartKind]) -> Vec<String>;

impl Command {
    pub const ALL: [Command; 4] = [
        Command::Overall,
        Command::Payments,
        Command::Customer,
        Command::Charts,
    ];

    /// The word typed at the prompt.
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Overall => "overall",
            Self::Payments => "payments",
            Self::Customer => "customer",
            Self::Charts => "charts",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Overall => "Overall Analytics",
            Self::Payments => "Payment Trends",
            Self::Customer => "Customer Behavior",
            Self::Charts => "Charts",
        }
    }

    pub fn handler(self) -> Handler {
        match self {
            Self::Overall => overall_view,
            Self::Payments => payments_view,
            Self::Customer => customer_view,
            Self::Charts => charts_view,
        }
    }

    pub fn render(self, session: &Session, charts: &[ChartKind]) -> Vec<String> {
        (self.handler())(session, charts)
    }

    /// The data behind a view, for `quechat view --json`.
    pub fn data(self, session: &Session, charts: &[ChartKind]) -> serde_json::Value {
        let metrics = session.metrics().to_json();
        let series = session.series();
        match self {
            Self::Overall => serde_json::json!({
                "revenue": metrics["revenue"],
                "orders": metrics["orders"],
                "unique_customers": metrics["customers"]["unique"],
            }),
            Self::Payments => serde_json::json!({
                "top_payment_method": metrics["popularity"]["top_payment_method"],
                "payment_distribution": series.payment_distribution,
            }),
            Self::Customer => serde_json::json!({
                "customers": metrics["customers"],
                "popularity": metrics["popularity"],
                "feedback": metrics["feedback"],
            }),
            Self::Charts => {
                let all = series.to_json();
                let mut out = serde_json::Map::new();
                for kind in ChartKind::ALL {
                    if !charts.is_empty() && !charts.contains(&kind) {
                        continue;
                    }
                    let key = match kind {
                        ChartKind::OrderingTimes => "hourly_orders",
                        ChartKind::MonthlySales => "monthly_sales",
                        ChartKind::Categories => "category_distribution",
                    };
                    out.insert(key.to_string(), all[key].clone());
                }
                serde_json::Value::Object(out)
            }
        }
    }
}

fn overall_view(session: &Session, _: &[ChartKind]) -> Vec<String> {
    views::overall(session.metrics())
}

fn payments_view(session: &Session, _: &[ChartKind]) -> Vec<String> {
    views::payments(session.metrics(), session.series())
}

fn customer_view(session: &Session, _: &[ChartKind]) -> Vec<String> {
    views::customer(session.metrics())
}

fn charts_view(session: &Session, selected: &[ChartKind]) -> Vec<String> {
    views::charts(selected, session.series())
}

impl std::str::FromStr for Command {
    type Err = UnknownCommand;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|c| c.keyword() == wanted)
            .ok_or_else(|| UnknownCommand(s.trim().to_string()))
    }
}

/// Source of the owner's answers.
pub trait Prompter {
    /// `None` once no more input can arrive.
    fn ask(&mut self, prompt: &str) -> Result<Option<String>>;

    fn choose_charts(&mut self) -> Result<Vec<ChartKind>>;
}

/// Interactive prompts on the controlling terminal.
pub struct TermPrompter {
    theme: ColorfulTheme,
}

impl TermPrompter {
    pub fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
        }
    }
}

impl Default for TermPrompter {
    fn default() -> Self {
        Self::new()
    }
}

impl Prompter for TermPrompter {
    fn ask(&mut self, prompt: &str) -> Result<Option<String>> {
        let answer: String = Input::with_theme(&self.theme)
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()?;
        Ok(Some(answer))
    }

    fn choose_charts(&mut self) -> Result<Vec<ChartKind>> {
        let labels: Vec<&str> = ChartKind::ALL.iter().map(|k| k.label()).collect();
        let picked = MultiSelect::with_theme(&self.theme)
            .with_prompt("Which charts would you like to see? (space to select, enter to confirm)")
            .items(&labels)
            .interact()?;
        Ok(picked.into_iter().map(|i| ChartKind::ALL[i]).collect())
    }
}

/// Line-oriented prompts for piped input.
///
/// The chart answer is a comma-separated list of chart names or 1-based
/// numbers; an empty answer selects every chart.
pub struct LinePrompter<R> {
    input: R,
}

impl<R: BufRead> LinePrompter<R> {
    pub fn new(input: R) -> Self {
        Self { input }
    }

    fn read_line(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }
}

impl<R: BufRead> Prompter for LinePrompter<R> {
    fn ask(&mut self, _prompt: &str) -> Result<Option<String>> {
        self.read_line()
    }

    fn choose_charts(&mut self) -> Result<Vec<ChartKind>> {
        let Some(line) = self.read_line()? else {
            return Ok(Vec::new());
        };
        Ok(parse_chart_list(&line))
    }
}

fn parse_chart_list(line: &str) -> Vec<ChartKind> {
    let mut picked = Vec::new();
    for token in line.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        let kind = match token.parse::<usize>() {
            Ok(n) if (1..=ChartKind::ALL.len()).contains(&n) => Some(ChartKind::ALL[n - 1]),
            Ok(_) => None,
            Err(_) => ChartKind::from_str(token, true).ok(),
        };
        match kind {
            Some(k) if !picked.contains(&k) => picked.push(k),
            Some(_) => {}
            None => debug!(token, "ignoring unknown chart"),
        }
    }
    picked
}

fn write_lines<W: Write>(out: &mut W, lines: &[String]) -> Result<()> {
    for line in lines {
        writeln!(out, "{line}")?;
    }
    Ok(())
}

fn is_yes(answer: &str) -> bool {
    answer.trim().eq_ignore_ascii_case("y")
}

/// Run the chat until the owner declines to continue or input runs out.
pub fn run_chat<P: Prompter, W: Write>(
    session: &Session,
    owner: &str,
    prompter: &mut P,
    out: &mut W,
) -> Result<()> {
    let titles: Vec<&str> = Command::ALL.iter().map(|c| c.title()).collect();
    write_lines(out, &views::greeting(owner, &titles))?;

    let opening = format!("Hi {owner}, what would you like to know more about today?");
    loop {
        writeln!(out)?;
        let Some(request) = prompter.ask(&opening)? else {
            break;
        };

        let command = match request.parse::<Command>() {
            Ok(command) => command,
            Err(err) => {
                debug!(%err, "no view for request");
                let options: Vec<&str> = Command::ALL.iter().map(|c| c.keyword()).collect();
                writeln!(
                    out,
                    "{} Please type one of: {}",
                    style("?").yellow(),
                    options.join(", ")
                )?;
                continue;
            }
        };

        let charts = if command == Command::Charts {
            writeln!(
                out,
                "The following charts are available for you to inspect. Select the ones you would like to see."
            )?;
            prompter.choose_charts()?
        } else {
            Vec::new()
        };
        write_lines(out, &command.render(session, &charts))?;

        writeln!(out)?;
        match prompter.ask(views::FOLLOW_UP_PROMPT)? {
            Some(answer) if is_yes(&answer) => {
                writeln!(out, "{}", views::CONTINUE_MESSAGE)?;
            }
            _ => {
                writeln!(out, "{}", views::FAREWELL)?;
                return Ok(());
            }
        }
    }
    writeln!(out, "{}", views::FAREWELL)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::{
        categories_from_reader, feedback_from_reader, menu_from_reader, orders_from_reader,
    };
    use crate::session::Tables;

    fn session() -> Session {
        Session::from_tables(Tables {
            categories: categories_from_reader("category_id,category_name\n1,Mains\n".as_bytes())
                .unwrap(),
            menu: menu_from_reader(
                "item_id,item_name,description,price,category_id,is_vegetarian,is_spicy,is_gluten_free\n\
                 10,Taco,,5.00,1,,,\n"
                    .as_bytes(),
            )
            .unwrap(),
            orders: orders_from_reader(
                "order_id,item_id,customer_id,quantity,special_request,subtotal,payment_method,order_status,order_placed\n\
                 1,10,100,2,,10.00,Cash,Completed,2024-01-05 12:30:00\n\
                 2,10,101,1,,5.00,Cash,Cancelled,2024-01-06 19:10:00\n"
                    .as_bytes(),
            )
            .unwrap(),
            feedback: feedback_from_reader(
                "Customer_ID,Item_ID,Feedback_Text,Rating,Feedback_Category,Submission_Timestamp\n"
                    .as_bytes(),
            )
            .unwrap(),
        })
    }

    fn chat(script: &str) -> String {
        let mut prompter = LinePrompter::new(script.as_bytes());
        let mut out = Vec::new();
        run_chat(&session(), "Niki", &mut prompter, &mut out).unwrap();
        console::strip_ansi_codes(&String::from_utf8(out).unwrap()).into_owned()
    }

    #[test]
    fn command_parsing_is_case_insensitive_and_trimmed() {
        assert_eq!("overall".parse::<Command>(), Ok(Command::Overall));
        assert_eq!("  Payments \n".parse::<Command>(), Ok(Command::Payments));
        assert_eq!("CUSTOMER".parse::<Command>(), Ok(Command::Customer));
        assert_eq!("Charts".parse::<Command>(), Ok(Command::Charts));
        assert_eq!(
            "refunds".parse::<Command>(),
            Err(UnknownCommand("refunds".into()))
        );
        assert!("".parse::<Command>().is_err());
    }

    #[test]
    fn every_command_has_a_handler() {
        let session = session();
        for command in Command::ALL {
            assert!(!command.render(&session, &[]).is_empty(), "{command:?}");
        }
    }

    #[test]
    fn view_data_matches_the_view() {
        let session = session();
        let overall = Command::Overall.data(&session, &[]);
        assert_eq!(overall["revenue"]["gmv_display"], "$ 15");
        assert_eq!(overall["orders"]["placed"], 2);
        assert_eq!(overall["unique_customers"], 2);

        let charts = Command::Charts.data(&session, &[ChartKind::MonthlySales]);
        let keys: Vec<&String> = charts.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["monthly_sales"]);

        let all = Command::Charts.data(&session, &[]);
        assert_eq!(all.as_object().unwrap().len(), 3);
        assert_eq!(all["hourly_orders"][19], 1);
    }

    #[test]
    fn overall_then_decline_ends_session() {
        let text = chat("overall\nn\n");
        assert!(text.contains("Hi Niki, Welcome to your Analytics portal."));
        assert!(text.contains("Your restaurant recorded $ 15 in sales."));
        assert!(text.trim_end().ends_with(views::FAREWELL));
    }

    #[test]
    fn yes_continues_to_another_view() {
        let text = chat("overall\ny\npayments\nno\n");
        assert!(text.contains(views::CONTINUE_MESSAGE));
        assert!(text.contains("was Cash, used in 2 transactions."));
        assert_eq!(text.matches(views::FAREWELL).count(), 1);
    }

    #[test]
    fn unrecognized_request_lists_options() {
        let text = chat("refunds\n");
        assert!(text.contains("Please type one of: overall, payments, customer, charts"));
        assert!(!text.contains("Overall Analytics\n─"));
        assert!(text.contains(views::FAREWELL));
    }

    #[test]
    fn charts_render_every_selected_chart() {
        let text = chat("charts\nordering-times, 2\nn\n");
        assert!(text.contains(ChartKind::OrderingTimes.label()));
        assert!(text.contains(ChartKind::MonthlySales.label()));
        assert!(!text.contains("Below shown is a breakdown of the categories"));
    }

    #[test]
    fn chart_list_parser_accepts_names_and_numbers() {
        assert_eq!(
            parse_chart_list("3, monthly-sales, 3, bogus, 9"),
            vec![ChartKind::Categories, ChartKind::MonthlySales]
        );
        assert!(parse_chart_list("").is_empty());
    }
}
