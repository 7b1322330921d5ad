use chrono::{DateTime, Utc};
use kiabi_po_to_report::{ExtractOptions, MergePolicy, RenderOptions, render_html_report};
use worker::{Context, Env, FormEntry, Request, Response, Result, RouteContext, Router};

use crate::error::ApiError;
use crate::models::{DEFAULT_COMPANY_NAME, MAX_UPLOAD_FILES, UPLOAD_FIELD_NAME};
use crate::report_pipeline;

#[derive(Debug, Clone)]
pub struct AppState {
    pub company_name: String,
    pub merge_policy: MergePolicy,
}

pub async fn handle(req: Request, env: Env, _ctx: Context) -> Result<Response> {
    let company_name = env
        .var("COMPANY_NAME")
        .map(|value| value.to_string())
        .unwrap_or_else(|_| DEFAULT_COMPANY_NAME.to_string());
    let merge_policy =
        merge_policy_from_env(env.var("MERGE_POLICY").map(|value| value.to_string()).ok());

    let state = AppState {
        company_name,
        merge_policy,
    };

    Router::with_data(state)
        .get("/", index_route)
        .post_async("/", report_route)
        .post_async("/export", export_route)
        .run(req, env)
        .await
}

/// Parse the MERGE_POLICY variable, defaulting to last-wins on anything
/// missing or unrecognized.
pub fn merge_policy_from_env(value: Option<String>) -> MergePolicy {
    value
        .as_deref()
        .and_then(|raw| raw.parse::<MergePolicy>().ok())
        .unwrap_or(MergePolicy::LastWins)
}

pub fn report_timestamp(now: DateTime<Utc>) -> String {
    now.format("%Y-%m-%d %H:%M UTC").to_string()
}

fn extract_options(state: &AppState) -> ExtractOptions {
    ExtractOptions {
        merge_policy: state.merge_policy,
        ..ExtractOptions::default()
    }
}

fn index_route(_req: Request, ctx: RouteContext<AppState>) -> Result<Response> {
    html_response(&upload_page(&ctx.data.company_name, None))
}

async fn report_route(mut req: Request, ctx: RouteContext<AppState>) -> Result<Response> {
    match report_response(&mut req, &ctx.data).await {
        Ok(response) => Ok(response),
        Err(error) => error.into_response(),
    }
}

async fn export_route(mut req: Request, ctx: RouteContext<AppState>) -> Result<Response> {
    match export_response(&mut req, &ctx.data).await {
        Ok(response) => Ok(response),
        Err(error) => error.into_response(),
    }
}

async fn report_response(req: &mut Request, state: &AppState) -> Result<Response, ApiError> {
    let files = read_uploads(req).await?;
    let outcome = report_pipeline::process_uploads(&files, &extract_options(state));

    if !outcome.has_data() {
        let notice = if outcome.failed_files.is_empty() {
            "No PO data extracted. Check PDF format.".to_string()
        } else {
            format!(
                "No PO data extracted. {} file(s) failed to parse.",
                outcome.failed_files.len()
            )
        };
        return Ok(html_response(&upload_page(&state.company_name, Some(&notice)))?);
    }

    let html = render_html_report(
        &outcome.report,
        &RenderOptions {
            company_name: state.company_name.clone(),
            generated_on: Some(report_timestamp(Utc::now())),
        },
    );
    Ok(html_response(&html)?)
}

async fn export_response(req: &mut Request, state: &AppState) -> Result<Response, ApiError> {
    let files = read_uploads(req).await?;
    let outcome = report_pipeline::process_uploads(&files, &extract_options(state));

    if !outcome.has_data() {
        return Err(ApiError::NotFound(
            "no PO data extracted from the uploaded files".to_string(),
        ));
    }

    let (csv, filename) = report_pipeline::csv_attachment(&outcome)?;
    let mut response = Response::ok(csv)?;
    response
        .headers_mut()
        .set("Content-Type", "text/csv; charset=utf-8")?;
    response.headers_mut().set(
        "Content-Disposition",
        &format!("attachment; filename=\"{filename}\""),
    )?;
    response.headers_mut().set("Cache-Control", "no-store")?;
    Ok(response)
}

async fn read_uploads(req: &mut Request) -> Result<Vec<(String, Vec<u8>)>, ApiError> {
    let form = req
        .form_data()
        .await
        .map_err(|error| ApiError::BadRequest(format!("invalid multipart form: {error}")))?;

    let Some(entries) = form.get_all(UPLOAD_FIELD_NAME) else {
        return Err(ApiError::BadRequest(format!(
            "missing '{UPLOAD_FIELD_NAME}' upload field"
        )));
    };

    let mut files = Vec::new();
    for entry in entries {
        let FormEntry::File(file) = entry else {
            continue;
        };
        if file.name().is_empty() {
            continue;
        }
        if files.len() >= MAX_UPLOAD_FILES {
            return Err(ApiError::Validation(format!(
                "at most {MAX_UPLOAD_FILES} files per batch"
            )));
        }

        let bytes = file.bytes().await?;
        if bytes.is_empty() {
            continue;
        }
        files.push((file.name(), bytes));
    }

    if files.is_empty() {
        return Err(ApiError::BadRequest(
            "no PDF files were uploaded".to_string(),
        ));
    }
    Ok(files)
}

fn html_response(body: &str) -> Result<Response> {
    let mut response = Response::from_html(body)?;
    response.headers_mut().set("Cache-Control", "no-store")?;
    Ok(response)
}

const UPLOAD_CSS: &str = "\
body { background: #f0f2f5; font-family: sans-serif; }\n\
.card { max-width: 640px; margin: 60px auto; background: #fff; border-radius: 15px; box-shadow: 0 10px 30px rgba(0,0,0,0.1); overflow: hidden; }\n\
.header { background: #1e3a8a; color: white; padding: 25px; text-align: center; }\n\
.body { padding: 40px; text-align: center; }\n\
.upload-box { border: 2px dashed #1e3a8a; padding: 40px; border-radius: 10px; margin-bottom: 20px; }\n\
.message { color: #b91c1c; font-weight: bold; margin-bottom: 15px; }\n\
button { background: #1e3a8a; color: white; border: none; padding: 12px 30px; border-radius: 6px; font-size: 1rem; cursor: pointer; }\n";

/// Upload form page, optionally carrying a user-visible notice (for the
/// empty-result path).
pub fn upload_page(company_name: &str, message: Option<&str>) -> String {
    let notice = message
        .map(|text| format!("<p class=\"message\">{text}</p>"))
        .unwrap_or_default();

    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"UTF-8\">\n\
         <title>PO Report Generator</title>\n<style>\n{UPLOAD_CSS}</style>\n</head>\n<body>\n\
         <div class=\"card\">\n\
         <div class=\"header\"><h2>KIABI PO REPORT GENERATOR</h2><p>{company_name}</p></div>\n\
         <div class=\"body\">\n{notice}\
         <form action=\"/\" method=\"post\" enctype=\"multipart/form-data\">\n\
         <div class=\"upload-box\">\n\
         <h5>Select booking and PO files</h5>\n\
         <p>Select multiple PDF files at once</p>\n\
         <input type=\"file\" name=\"{UPLOAD_FIELD_NAME}\" multiple accept=\".pdf\" required>\n\
         </div>\n\
         <button type=\"submit\">Generate Report</button>\n\
         <button type=\"submit\" formaction=\"/export\">Download Spreadsheet</button>\n\
         </form>\n</div>\n</div>\n</body>\n</html>\n"
    )
}
