//! HTTP surface: the listing page, form endpoints, and the CSV download.
//!
//! Handlers receive an explicit [`AppContext`] through `web::Data`. Every
//! mutating endpoint answers with a redirect back to the listing.

use std::net::SocketAddr;

use actix_web::http::{StatusCode, header};
use actix_web::{App, HttpResponse, HttpServer, ResponseError, get, post, web};
use minijinja::{Environment, context};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{self, TelexId, TelexRecord};
use crate::tracker::{AddOutcome, Tracker};

const INDEX_TEMPLATE: &str = "index.html";

/// Everything a handler needs. Built once at startup.
pub struct AppContext {
    tracker: Tracker,
    templates: Environment<'static>,
}

impl AppContext {
    pub fn new(tracker: Tracker) -> Result<Self> {
        let mut templates = Environment::new();
        templates.add_template(INDEX_TEMPLATE, include_str!("../../templates/index.html"))?;
        Ok(Self { tracker, templates })
    }

    pub fn tracker(&self) -> &Tracker {
        &self.tracker
    }
}

/// Register every route. Shared by the server and the tests.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(index)
        .service(add_telex)
        .service(complete_part)
        .service(complete_telex)
        .service(add_remark)
        .service(delete_telex)
        .service(export_csv)
        .service(healthz);
}

/// Run the HTTP server until it is stopped.
pub async fn serve(ctx: AppContext, bind: SocketAddr) -> Result<()> {
    let data = web::Data::new(ctx);
    tracing::info!(%bind, "listening");

    HttpServer::new(move || {
        App::new()
            .app_data(data.clone())
            .wrap(tracing_actix_web::TracingLogger::default())
            .configure(routes)
    })
    .bind(bind)?
    .run()
    .await?;

    tracing::info!("web server stopped");
    Ok(())
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::InvalidTrackKind(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

fn to_listing() -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, "/"))
        .finish()
}

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

/// Template-facing view of one telex.
#[derive(Serialize)]
struct TelexView {
    id: i64,
    telex_number: String,
    status: &'static str,
    status_label: &'static str,
    done: bool,
    assignee_widebody: Option<String>,
    assignee_narrowbody: Option<String>,
    remark: Option<String>,
    created_at: String,
    completed_at: Option<String>,
}

impl From<TelexRecord> for TelexView {
    fn from(record: TelexRecord) -> Self {
        Self {
            id: record.id.0,
            telex_number: record.telex_number,
            status: record.status.as_str(),
            status_label: record.status.label(),
            done: record.status == model::Status::Done,
            assignee_widebody: record.assignee_widebody,
            assignee_narrowbody: record.assignee_narrowbody,
            remark: record.remark,
            created_at: model::format_display(record.created_at),
            completed_at: record.completed_at.map(model::format_display),
        }
    }
}

#[get("/")]
async fn index(ctx: web::Data<AppContext>) -> Result<HttpResponse> {
    let listing = ctx.tracker.list_all().await?;
    let (pending, done) = (listing.pending, listing.done);
    let records: Vec<TelexView> = listing.records.into_iter().map(TelexView::from).collect();

    let html = ctx.templates.get_template(INDEX_TEMPLATE)?.render(context! {
        records,
        pending,
        done,
    })?;

    Ok(HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(html))
}

// ---------------------------------------------------------------------------
// Mutations
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct AddTelexForm {
    nomor_telex: Option<String>,
}

#[post("/tambah_telex")]
async fn add_telex(
    ctx: web::Data<AppContext>,
    form: web::Form<AddTelexForm>,
) -> Result<HttpResponse> {
    if ctx.tracker.add(form.nomor_telex.as_deref()).await? == AddOutcome::Skipped {
        tracing::debug!("add ignored: empty nomor_telex");
    }
    Ok(to_listing())
}

#[derive(Deserialize)]
struct AssignForm {
    nama_pekerja: Option<String>,
}

/// Missing and empty names both unassign the track.
#[post("/selesaikan_bagian/{id}/{tipe}")]
async fn complete_part(
    ctx: web::Data<AppContext>,
    path: web::Path<(i64, String)>,
    form: web::Form<AssignForm>,
) -> Result<HttpResponse> {
    let (id, tipe) = path.into_inner();
    let name = form.nama_pekerja.as_deref().unwrap_or_default();
    assign_or_ignore(&ctx.tracker, TelexId(id), &tipe, name).await
}

#[derive(Deserialize)]
struct LegacyAssignForm {
    nama_pekerja: Option<String>,
    tipe_pesawat: Option<String>,
}

/// Older form that names the track in a body field instead of the path.
#[post("/selesaikan_telex/{id}")]
async fn complete_telex(
    ctx: web::Data<AppContext>,
    path: web::Path<i64>,
    form: web::Form<LegacyAssignForm>,
) -> Result<HttpResponse> {
    let id = TelexId(path.into_inner());
    let tipe = form.tipe_pesawat.as_deref().unwrap_or_default();
    let name = form.nama_pekerja.as_deref().unwrap_or_default();
    assign_or_ignore(&ctx.tracker, id, tipe, name).await
}

/// An unknown track selector is a no-op that still lands on the listing.
async fn assign_or_ignore(
    tracker: &Tracker,
    id: TelexId,
    tipe: &str,
    name: &str,
) -> Result<HttpResponse> {
    match tracker.assign_track_by_kind(id, tipe, name).await {
        Ok(_) => Ok(to_listing()),
        Err(Error::InvalidTrackKind(kind)) => {
            tracing::warn!(telex.id = id.0, kind = %kind, "ignoring unknown track kind");
            Ok(to_listing())
        }
        Err(e) => Err(e),
    }
}

#[derive(Deserialize)]
struct RemarkForm {
    remark_input: Option<String>,
}

#[post("/tambah_remark/{id}")]
async fn add_remark(
    ctx: web::Data<AppContext>,
    path: web::Path<i64>,
    form: web::Form<RemarkForm>,
) -> Result<HttpResponse> {
    let id = TelexId(path.into_inner());
    ctx.tracker
        .set_remark(id, form.remark_input.as_deref())
        .await?;
    Ok(to_listing())
}

#[post("/hapus_telex/{id}")]
async fn delete_telex(ctx: web::Data<AppContext>, path: web::Path<i64>) -> Result<HttpResponse> {
    ctx.tracker.delete(TelexId(path.into_inner())).await?;
    Ok(to_listing())
}

// ---------------------------------------------------------------------------
// Export + health
// ---------------------------------------------------------------------------

#[get("/ekspor_csv")]
async fn export_csv(ctx: web::Data<AppContext>) -> Result<HttpResponse> {
    let export = ctx.tracker.export_csv(chrono::Utc::now()).await?;
    Ok(HttpResponse::Ok()
        .insert_header((header::CONTENT_TYPE, "text/csv"))
        .insert_header((
            header::CONTENT_DISPOSITION,
            format!("attachment; filename={}", export.filename),
        ))
        .body(export.body))
}

#[get("/healthz")]
async fn healthz(ctx: web::Data<AppContext>) -> Result<HttpResponse> {
    ctx.tracker.db().health_check().await?;
    Ok(HttpResponse::Ok().content_type("text/plain").body("ok"))
}
