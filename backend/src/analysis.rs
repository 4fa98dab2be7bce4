use actix_web::{post, web, HttpResponse, Responder};
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::config::AnalysisConfig;
use crate::models::StudentIdRequest;
use crate::responses::{not_found, server_error};
use crate::students::{load_student_record, StudentRecord};
use crate::AppState;

pub const SYSTEM_INSTRUCTION: &str = "You are an educational AI assistant. Provide a concise, professional, and empathetic analysis of a student's academic performance and suggestions for improvement. The analysis should be based on the provided student data.";

pub const REPORT_UNAVAILABLE: &str = "Could not generate report at this time.";
pub const NO_ANALYSIS: &str = "No analysis available.";
pub const ANALYSIS_ERROR: &str = "An error occurred while generating the report.";

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: [Content<'a>; 1],
    system_instruction: Content<'a>,
}

#[derive(Debug, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Text of the first part of the first candidate, if any.
    pub fn first_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .next()?
            .text
    }
}

/// Client for the Gemini `generateContent` endpoint. `analyze` never fails:
/// every downstream problem turns into one of the fixed fallback strings.
#[derive(Clone)]
pub struct AnalysisClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl AnalysisClient {
    pub fn new(config: &AnalysisConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            http,
            endpoint: format!(
                "{}/v1beta/models/{}:generateContent",
                config.api_base.trim_end_matches('/'),
                config.model
            ),
            api_key: config.api_key.clone(),
        })
    }

    pub async fn analyze(&self, prompt: &str) -> String {
        match self.generate(prompt).await {
            Ok(Reply::Parsed(parsed)) => parsed
                .first_text()
                .unwrap_or_else(|| NO_ANALYSIS.to_string()),
            Ok(Reply::Rejected(status, body)) => {
                warn!("Analysis API call failed with status {}: {}", status, body);
                REPORT_UNAVAILABLE.to_string()
            }
            Err(e) => {
                error!("Analysis request failed: {}", e);
                ANALYSIS_ERROR.to_string()
            }
        }
    }

    /// Errors come back with their URL stripped, since the URL carries the
    /// API key.
    async fn generate(&self, prompt: &str) -> Result<Reply, reqwest::Error> {
        let request = GenerateContentRequest {
            contents: [Content {
                parts: [Part { text: prompt }],
            }],
            system_instruction: Content {
                parts: [Part {
                    text: SYSTEM_INSTRUCTION,
                }],
            },
        };

        debug!("Sending analysis request to {}", self.endpoint);
        let response = self
            .http
            .post(&self.endpoint)
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(reqwest::Error::without_url)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Ok(Reply::Rejected(status, body));
        }

        let parsed = response
            .json::<GenerateContentResponse>()
            .await
            .map_err(reqwest::Error::without_url)?;

        Ok(Reply::Parsed(parsed))
    }
}

enum Reply {
    Parsed(GenerateContentResponse),
    Rejected(reqwest::StatusCode, String),
}

pub fn build_prompt(record: &StudentRecord) -> String {
    let student = &record.student;
    format!(
        "Generate a detailed academic and behavioral analysis for the following student.\n\
         Student Name: {}\n\
         Roll Number: {}\n\
         Department: {}\n\
         Semester: {}\n\
         Academic Results: {}\n\
         Attendance Record: {}\n\
         Performance Remarks: {}\n",
        student.name,
        student.roll_number,
        student.department,
        student.semester,
        serde_json::to_string(&record.results).unwrap_or_default(),
        serde_json::to_string(&record.attendance).unwrap_or_default(),
        serde_json::to_string(&record.performance).unwrap_or_default(),
    )
}

#[post("/ai-analysis")]
async fn ai_analysis(
    app_state: web::Data<AppState>,
    req: web::Json<StudentIdRequest>,
) -> impl Responder {
    let record = match load_student_record(app_state.store.as_ref(), req.student_id).await {
        Ok(Some(record)) => record,
        Ok(None) => return not_found("Student not found."),
        Err(e) => {
            return server_error(
                "AI analysis data fetch failed",
                &e,
                "Failed to generate AI analysis report",
            )
        }
    };

    info!("Generating analysis report for student {}", req.student_id);
    let report = app_state.analysis.analyze(&build_prompt(&record)).await;

    HttpResponse::Ok().json(json!({
        "success": true,
        "report": report,
    }))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(ai_analysis);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AttendanceRecord, ExamResult, PerformanceNote, Student};
    use actix_web::{App, HttpServer};
    use chrono::NaiveDate;
    use std::time::Duration;

    fn record() -> StudentRecord {
        StudentRecord {
            student: Student {
                id: 1,
                name: "Rahim Uddin".to_string(),
                roll_number: 100,
                registration_number: 55,
                department: "CSE".to_string(),
                semester: "5th".to_string(),
                session: "2021-22".to_string(),
                phone: None,
                password_hash: Some("$argon2id$secret".to_string()),
            },
            results: vec![ExamResult {
                id: 1,
                student_id: 1,
                subject: "Math".to_string(),
                marks: 90,
                grade: "A".to_string(),
                exam_type: "Final".to_string(),
            }],
            attendance: vec![AttendanceRecord {
                id: 1,
                student_id: 1,
                date: NaiveDate::from_ymd_opt(2025, 3, 2).unwrap(),
                status: "Present".to_string(),
            }],
            performance: Some(PerformanceNote {
                id: 1,
                student_id: 1,
                remarks: "Attentive in class".to_string(),
                rating: Some(4),
            }),
        }
    }

    /// Serves `reply` for every request on an ephemeral local port.
    fn stub_server(reply: fn() -> HttpResponse) -> String {
        let server = HttpServer::new(move || {
            App::new().default_service(web::to(move || async move { reply() }))
        })
        .workers(1)
        .bind(("127.0.0.1", 0))
        .unwrap();
        let addr = server.addrs()[0];
        actix_web::rt::spawn(server.run());
        format!("http://{}", addr)
    }

    fn client_for(api_base: String) -> AnalysisClient {
        client_with_key(api_base, "test-key")
    }

    fn client_with_key(api_base: String, api_key: &str) -> AnalysisClient {
        AnalysisClient::new(&AnalysisConfig {
            api_base,
            api_key: api_key.to_string(),
            timeout: Duration::from_secs(5),
            ..AnalysisConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn prompt_embeds_student_data_but_not_password_hash() {
        let prompt = build_prompt(&record());
        assert!(prompt.starts_with("Generate a detailed academic and behavioral analysis"));
        assert!(prompt.contains("Student Name: Rahim Uddin\n"));
        assert!(prompt.contains("Roll Number: 100\n"));
        assert!(prompt.contains("\"subject\":\"Math\""));
        assert!(prompt.contains("\"status\":\"Present\""));
        assert!(prompt.contains("Attentive in class"));
        assert!(!prompt.contains("argon2"));
    }

    #[test]
    fn prompt_renders_missing_performance_as_null() {
        let mut record = record();
        record.performance = None;
        assert!(build_prompt(&record).ends_with("Performance Remarks: null\n"));
    }

    #[test]
    fn first_text_walks_the_candidate_shape() {
        let parsed: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{"content": {"parts": [{"text": "Doing well."}, {"text": "ignored"}]}}]
        }))
        .unwrap();
        assert_eq!(parsed.first_text().as_deref(), Some("Doing well."));

        let empty: GenerateContentResponse = serde_json::from_value(json!({})).unwrap();
        assert_eq!(empty.first_text(), None);

        let no_parts: GenerateContentResponse =
            serde_json::from_value(json!({"candidates": [{"content": {"parts": []}}]})).unwrap();
        assert_eq!(no_parts.first_text(), None);
    }

    #[actix_web::test]
    async fn non_success_status_yields_fixed_fallback() {
        let base = stub_server(|| HttpResponse::InternalServerError().body("boom"));
        let report = client_for(base).analyze("prompt").await;
        assert_eq!(report, "Could not generate report at this time.");
    }

    #[actix_web::test]
    async fn successful_response_is_returned_verbatim() {
        let base = stub_server(|| {
            HttpResponse::Ok().json(json!({
                "candidates": [{"content": {"parts": [{"text": "Strong in Math.\nWork on English."}]}}]
            }))
        });
        let report = client_for(base).analyze("prompt").await;
        assert_eq!(report, "Strong in Math.\nWork on English.");
    }

    #[actix_web::test]
    async fn response_without_candidates_yields_no_analysis() {
        let base = stub_server(|| HttpResponse::Ok().json(json!({"candidates": []})));
        let report = client_for(base).analyze("prompt").await;
        assert_eq!(report, NO_ANALYSIS);
    }

    #[actix_web::test]
    async fn malformed_body_yields_error_fallback() {
        let base = stub_server(|| {
            HttpResponse::Ok()
                .content_type("application/json")
                .body("not json")
        });
        let report = client_for(base).analyze("prompt").await;
        assert_eq!(report, ANALYSIS_ERROR);
    }

    #[actix_web::test]
    async fn unreachable_endpoint_yields_error_fallback() {
        // Port 1 is reserved and nothing listens on it.
        let report = client_for("http://127.0.0.1:1".to_string())
            .analyze("prompt")
            .await;
        assert_eq!(report, ANALYSIS_ERROR);
    }

    #[actix_web::test]
    async fn transport_errors_do_not_carry_the_api_key() {
        let client = client_with_key("http://127.0.0.1:1".to_string(), "SUPER-SECRET-KEY");
        let err = match client.generate("prompt").await {
            Err(e) => e,
            Ok(_) => panic!("nothing listens on port 1"),
        };

        assert!(err.url().is_none());
        assert!(!format!("Analysis request failed: {}", err).contains("SUPER-SECRET-KEY"));
        assert!(!format!("{:?}", err).contains("SUPER-SECRET-KEY"));
    }

    #[actix_web::test]
    async fn decode_errors_do_not_carry_the_api_key() {
        let base = stub_server(|| {
            HttpResponse::Ok()
                .content_type("application/json")
                .body("not json")
        });
        let err = match client_with_key(base, "SUPER-SECRET-KEY").generate("prompt").await {
            Err(e) => e,
            Ok(_) => panic!("body is not JSON"),
        };

        assert!(err.is_decode());
        assert!(!format!("Analysis request failed: {}", err).contains("SUPER-SECRET-KEY"));
        assert!(!format!("{:?}", err).contains("SUPER-SECRET-KEY"));
    }
}
