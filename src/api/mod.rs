use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Router,
    extract::{
        Json, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use clap::{Parser, ValueEnum};
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

use crate::core::{LoanCalculator, LoanError, LoanRequest, PlanId, PlanRegistry, TimeSpec};

const MAX_YEARS_LEFT: f64 = 100.0;
const MIN_START_YEAR: i32 = 1900;
const MAX_START_YEAR: i32 = 2200;

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliTimeMethod {
    YearsLeft,
    StartYear,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
enum ApiTimeMethod {
    #[serde(alias = "yearsLeft", alias = "years-left")]
    YearsLeft,
    #[serde(alias = "startYear", alias = "start-year")]
    StartYear,
}

impl From<ApiTimeMethod> for CliTimeMethod {
    fn from(value: ApiTimeMethod) -> Self {
        match value {
            ApiTimeMethod::YearsLeft => CliTimeMethod::YearsLeft,
            ApiTimeMethod::StartYear => CliTimeMethod::StartYear,
        }
    }
}

/// A form value that may arrive as a JSON number or as text.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
enum FieldValue {
    Number(f64),
    Text(String),
}

impl FieldValue {
    fn is_blank(&self) -> bool {
        matches!(self, FieldValue::Text(text) if text.trim().is_empty())
    }

    fn to_f64(&self, field: &str) -> Result<f64, LoanError> {
        match self {
            FieldValue::Number(n) => Ok(*n),
            FieldValue::Text(text) => text
                .trim()
                .parse::<f64>()
                .map_err(|_| LoanError::invalid(field, format!("'{text}' is not a number"))),
        }
    }

    fn to_i32(&self, field: &str) -> Result<i32, LoanError> {
        match self {
            FieldValue::Number(n) if n.fract() == 0.0 && n.abs() <= f64::from(i32::MAX) => {
                Ok(*n as i32)
            }
            FieldValue::Number(n) => Err(LoanError::invalid(
                field,
                format!("{n} is not a whole year"),
            )),
            FieldValue::Text(text) => text
                .trim()
                .parse::<i32>()
                .map_err(|_| LoanError::invalid(field, format!("'{text}' is not a whole year"))),
        }
    }

    fn to_plan_id(&self) -> Result<PlanId, LoanError> {
        match self {
            FieldValue::Number(n) if n.fract() == 0.0 => format!("{}", *n as i64).parse(),
            FieldValue::Number(n) => Err(LoanError::UnknownPlan(n.to_string())),
            FieldValue::Text(text) => text.parse(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct CalculatePayload {
    #[serde(alias = "plan_type", alias = "plan")]
    plan_type: Option<FieldValue>,
    balance: Option<FieldValue>,
    salary: Option<FieldValue>,
    #[serde(alias = "time_method")]
    time_method: Option<ApiTimeMethod>,
    #[serde(alias = "years_left")]
    years_left: Option<FieldValue>,
    #[serde(alias = "start_year")]
    start_year: Option<FieldValue>,
    #[serde(alias = "extra_payment")]
    extra_payment: Option<FieldValue>,
}

#[derive(Parser, Debug)]
#[command(
    name = "student-loan calculate",
    about = "UK student loan repayment projection with extra-payment scenarios"
)]
struct Cli {
    #[arg(long, help = "Repayment plan: 1, 2, 4, 5 or postgraduate")]
    plan: String,
    #[arg(long, help = "Outstanding balance")]
    balance: f64,
    #[arg(long, help = "Annual salary before tax")]
    salary: f64,
    #[arg(long, value_enum, default_value_t = CliTimeMethod::YearsLeft)]
    time_method: CliTimeMethod,
    #[arg(long, help = "Years left until write-off, used with --time-method=years-left")]
    years_left: Option<f64>,
    #[arg(
        long,
        help = "Calendar year repayments started, used with --time-method=start-year"
    )]
    start_year: Option<i32>,
    #[arg(long, help = "Custom extra monthly payment to evaluate")]
    extra_payment: Option<f64>,
    #[arg(long, help = "JSON file replacing the built-in 2024/25 plan table")]
    plan_table: Option<PathBuf>,
    #[arg(long, default_value_t = false, help = "Pretty-print the JSON report")]
    pretty: bool,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

fn build_inputs(cli: &Cli) -> Result<LoanRequest, LoanError> {
    let plan: PlanId = cli.plan.parse()?;
    if !cli.balance.is_finite() || cli.balance < 0.0 {
        return Err(LoanError::invalid("balance", "must be >= 0"));
    }
    if !cli.salary.is_finite() || cli.salary < 0.0 {
        return Err(LoanError::invalid("salary", "must be >= 0"));
    }
    let time = match cli.time_method {
        CliTimeMethod::YearsLeft => {
            let Some(years_left) = cli.years_left else {
                return Err(LoanError::invalid(
                    "yearsLeft",
                    "is required when the time method is years_left",
                ));
            };
            if !years_left.is_finite() || years_left <= 0.0 {
                return Err(LoanError::invalid("yearsLeft", "must be > 0"));
            }
            if years_left > MAX_YEARS_LEFT {
                return Err(LoanError::invalid(
                    "yearsLeft",
                    format!("must be <= {MAX_YEARS_LEFT}"),
                ));
            }
            TimeSpec::YearsLeft(years_left)
        }
        CliTimeMethod::StartYear => {
            let Some(start_year) = cli.start_year else {
                return Err(LoanError::invalid(
                    "startYear",
                    "is required when the time method is start_year",
                ));
            };
            if !(MIN_START_YEAR..=MAX_START_YEAR).contains(&start_year) {
                return Err(LoanError::invalid(
                    "startYear",
                    format!("must be between {MIN_START_YEAR} and {MAX_START_YEAR}"),
                ));
            }
            TimeSpec::StartYear(start_year)
        }
    };
    if let Some(extra) = cli.extra_payment {
        if !extra.is_finite() || extra < 0.0 {
            return Err(LoanError::invalid("extraPayment", "must be >= 0"));
        }
    }

    Ok(LoanRequest {
        plan,
        balance: cli.balance,
        salary: cli.salary,
        time,
        extra_payment: cli.extra_payment.filter(|extra| *extra > 0.0),
    })
}

/// Runs the `calculate` subcommand and returns the JSON report.
pub fn run_cli<I, T>(args: I) -> Result<String, LoanError>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = Cli::try_parse_from(args)
        .map_err(|e| LoanError::invalid("arguments", e.to_string()))?;
    let registry = match &cli.plan_table {
        Some(path) => PlanRegistry::from_json_file(path)?,
        None => PlanRegistry::default(),
    };
    let request = build_inputs(&cli)?;
    let report = LoanCalculator::new(registry).calculate(&request)?;
    let json = if cli.pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    Ok(json)
}

pub async fn run_http_server(port: u16, calculator: LoanCalculator) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = router(Arc::new(calculator));

    let listener = TcpListener::bind(addr).await?;
    info!("student loan HTTP API listening on http://{addr}");
    info!("local access: http://127.0.0.1:{port}/api/plans");
    axum::serve(listener, app).await
}

fn router(calculator: Arc<LoanCalculator>) -> Router {
    Router::new()
        .route("/calculate", post(calculate_post_handler))
        .route(
            "/api/calculate",
            get(calculate_get_handler).post(calculate_post_handler),
        )
        .route("/api/plans", get(plans_handler))
        .fallback(not_found_handler)
        .with_state(calculator)
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn plans_handler(State(calculator): State<Arc<LoanCalculator>>) -> Response {
    json_response(StatusCode::OK, calculator.registry().plans())
}

async fn calculate_get_handler(
    State(calculator): State<Arc<LoanCalculator>>,
    payload: Result<Query<CalculatePayload>, QueryRejection>,
) -> Response {
    match payload {
        Ok(Query(payload)) => calculate_handler_impl(&calculator, payload),
        Err(rejection) => rejected_payload(&rejection.body_text()),
    }
}

async fn calculate_post_handler(
    State(calculator): State<Arc<LoanCalculator>>,
    payload: Result<Json<CalculatePayload>, JsonRejection>,
) -> Response {
    match payload {
        Ok(Json(payload)) => calculate_handler_impl(&calculator, payload),
        Err(rejection) => rejected_payload(&rejection.body_text()),
    }
}

fn rejected_payload(detail: &str) -> Response {
    warn!("rejected request payload: {detail}");
    error_response(
        StatusCode::BAD_REQUEST,
        &format!("Invalid request payload: {detail}"),
    )
}

fn calculate_handler_impl(calculator: &LoanCalculator, payload: CalculatePayload) -> Response {
    let report = api_request_from_payload(payload)
        .and_then(|request| calculator.calculate(&request));
    match report {
        Ok(report) => json_response(StatusCode::OK, report),
        Err(err) => {
            let (status, msg) = error_status(&err);
            if status.is_client_error() {
                warn!("rejected calculation: {err}");
            } else {
                error!("calculation failed: {err}");
            }
            error_response(status, &msg)
        }
    }
}

fn error_status(err: &LoanError) -> (StatusCode, String) {
    match err {
        LoanError::UnknownPlan(_) => (
            StatusCode::BAD_REQUEST,
            "Invalid repayment plan selected".to_string(),
        ),
        LoanError::HorizonExhausted { .. } => (
            StatusCode::BAD_REQUEST,
            "Your loan should already be written off!".to_string(),
        ),
        LoanError::InvalidInput { .. } => (StatusCode::BAD_REQUEST, err.to_string()),
        LoanError::PlanTable(_) | LoanError::Serialization(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
    }
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

#[cfg(test)]
fn api_request_from_json(json: &str) -> Result<LoanRequest, LoanError> {
    let payload = serde_json::from_str::<CalculatePayload>(json)
        .map_err(|e| LoanError::invalid("payload", e.to_string()))?;
    api_request_from_payload(payload)
}

fn required(value: Option<FieldValue>, field: &str) -> Result<FieldValue, LoanError> {
    match value {
        Some(value) if !value.is_blank() => Ok(value),
        _ => Err(LoanError::invalid(field, "is required")),
    }
}

fn optional(value: Option<FieldValue>) -> Option<FieldValue> {
    value.filter(|value| !value.is_blank())
}

fn api_request_from_payload(payload: CalculatePayload) -> Result<LoanRequest, LoanError> {
    let plan = required(payload.plan_type, "planType")?.to_plan_id()?;
    let mut cli = default_cli_for_api(plan);
    cli.balance = required(payload.balance, "balance")?.to_f64("balance")?;
    cli.salary = required(payload.salary, "salary")?.to_f64("salary")?;

    if let Some(v) = payload.time_method {
        cli.time_method = v.into();
    }
    if let Some(v) = optional(payload.years_left) {
        cli.years_left = Some(v.to_f64("yearsLeft")?);
    }
    if let Some(v) = optional(payload.start_year) {
        cli.start_year = Some(v.to_i32("startYear")?);
    }
    if let Some(v) = optional(payload.extra_payment) {
        cli.extra_payment = Some(v.to_f64("extraPayment")?);
    }

    build_inputs(&cli)
}

fn default_cli_for_api(plan: PlanId) -> Cli {
    Cli {
        plan: plan.to_string(),
        balance: 0.0,
        salary: 0.0,
        time_method: CliTimeMethod::YearsLeft,
        years_left: None,
        start_year: None,
        extra_payment: None,
        plan_table: None,
        pretty: false,
    }
}
