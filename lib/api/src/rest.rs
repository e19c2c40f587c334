use crate::context::ServiceContext;
use actix_cors::Cors;
use actix_web::{web, App, HttpResponse, HttpServer, Result as ActixResult};
use chrono::Utc;
use scorecast_core::{DatasetSchema, Error as CoreError, Record, SyntheticDataset};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Typed request body for predictions: the full declared field set, all
/// fields required, unknown fields rejected before the core sees them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StudentRecord {
    pub age: f64,
    pub gender: String,
    pub parental_education: String,
    pub household_income: f64,
    pub previous_gpa: f64,
    pub study_hours_per_week: f64,
    pub attendance_rate: f64,
    pub sleep_hours: f64,
    pub exercise_hours_per_week: f64,
    pub has_internet: f64,
    pub has_computer: f64,
    pub extracurricular_hours: f64,
    pub school_type: String,
    pub class_size: f64,
}

impl StudentRecord {
    pub fn into_record(self) -> Record {
        Record::new()
            .with_field("age", self.age)
            .with_field("gender", self.gender)
            .with_field("parental_education", self.parental_education)
            .with_field("household_income", self.household_income)
            .with_field("previous_gpa", self.previous_gpa)
            .with_field("study_hours_per_week", self.study_hours_per_week)
            .with_field("attendance_rate", self.attendance_rate)
            .with_field("sleep_hours", self.sleep_hours)
            .with_field("exercise_hours_per_week", self.exercise_hours_per_week)
            .with_field("has_internet", self.has_internet)
            .with_field("has_computer", self.has_computer)
            .with_field("extracurricular_hours", self.extracurricular_hours)
            .with_field("school_type", self.school_type)
            .with_field("class_size", self.class_size)
    }
}

#[derive(Serialize)]
struct BatchPrediction {
    index: usize,
    prediction: f64,
}

pub struct RestApi;

impl RestApi {
    pub async fn start(ctx: Arc<ServiceContext>, port: u16) -> std::io::Result<()> {
        HttpServer::new(move || {
            let cors = Cors::default()
                .allow_any_origin()
                .allow_any_method()
                .allow_any_header()
                .max_age(3600);

            App::new()
                .wrap(cors)
                .app_data(web::Data::new(ctx.clone()))
                .route("/", web::get().to(index))
                .route("/health", web::get().to(health))
                .route("/model/info", web::get().to(model_info))
                .route("/model/reload", web::post().to(model_reload))
                .route("/predict", web::post().to(predict))
                .route("/predict/batch", web::post().to(predict_batch))
                .route("/generate/sample", web::get().to(generate_sample))
        })
        .bind(("0.0.0.0", port))?
        .run()
        .await
    }
}

fn not_ready() -> HttpResponse {
    HttpResponse::ServiceUnavailable().json(serde_json::json!({
        "error": "Model not loaded"
    }))
}

fn core_error(err: &CoreError) -> HttpResponse {
    let body = serde_json::json!({ "error": err.to_string() });
    if err.is_schema_error() {
        HttpResponse::BadRequest().json(body)
    } else {
        HttpResponse::InternalServerError().json(body)
    }
}

async fn index() -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "service": "scorecast",
        "endpoints": {
            "GET /health": "service and model status",
            "GET /model/info": "metrics and column names of the loaded model",
            "POST /model/reload": "reload the model artifact from disk",
            "POST /predict": "predict one student record",
            "POST /predict/batch": "predict an array of student records",
            "GET /generate/sample": "sample records for trying the predict endpoints"
        }
    })))
}

async fn health(ctx: web::Data<Arc<ServiceContext>>) -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "timestamp": Utc::now().to_rfc3339(),
        "model_loaded": ctx.is_ready(),
    })))
}

async fn model_info(ctx: web::Data<Arc<ServiceContext>>) -> ActixResult<HttpResponse> {
    let Some(predictor) = ctx.predictor() else {
        return Ok(not_ready());
    };
    let bundle = predictor.bundle();

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "bundle_id": bundle.id,
        "trained_at": bundle.trained_at.to_rfc3339(),
        "estimator": bundle.report.estimator,
        "model_metrics": bundle.metrics,
        "train_size": bundle.report.train_size,
        "test_size": bundle.report.test_size,
        "feature_columns": bundle.feature_columns(),
        "target_column": bundle.target_column(),
        "feature_importances": bundle.report.feature_importances,
    })))
}

async fn model_reload(ctx: web::Data<Arc<ServiceContext>>) -> ActixResult<HttpResponse> {
    match ctx.reload() {
        Ok(()) => {
            let bundle_id = ctx.predictor().map(|p| p.bundle().id);
            Ok(HttpResponse::Ok().json(serde_json::json!({
                "result": true,
                "bundle_id": bundle_id,
            })))
        }
        Err(e) if e.is_not_found() => Ok(HttpResponse::NotFound().json(serde_json::json!({
            "error": e.to_string()
        }))),
        Err(e) => Ok(HttpResponse::InternalServerError().json(serde_json::json!({
            "error": e.to_string()
        }))),
    }
}

async fn predict(
    ctx: web::Data<Arc<ServiceContext>>,
    req: web::Json<StudentRecord>,
) -> ActixResult<HttpResponse> {
    let Some(predictor) = ctx.predictor() else {
        return Ok(not_ready());
    };

    let record = req.into_inner().into_record();
    match predictor.predict_one(&record) {
        Ok(prediction) => Ok(HttpResponse::Ok().json(serde_json::json!({
            "prediction": prediction,
            "timestamp": Utc::now().to_rfc3339(),
        }))),
        Err(e) => Ok(core_error(&e)),
    }
}

async fn predict_batch(
    ctx: web::Data<Arc<ServiceContext>>,
    req: web::Json<Vec<StudentRecord>>,
) -> ActixResult<HttpResponse> {
    let Some(predictor) = ctx.predictor() else {
        return Ok(not_ready());
    };

    let records: Vec<Record> = req
        .into_inner()
        .into_iter()
        .map(StudentRecord::into_record)
        .collect();

    // Batch predictions are atomic: any invalid record rejects the whole
    // request with the offending index in the error body.
    match predictor.predict_many(&records) {
        Ok(predictions) => {
            let results: Vec<BatchPrediction> = predictions
                .into_iter()
                .enumerate()
                .map(|(index, prediction)| BatchPrediction { index, prediction })
                .collect();
            Ok(HttpResponse::Ok().json(serde_json::json!({
                "predictions": results,
                "count": results.len(),
                "timestamp": Utc::now().to_rfc3339(),
            })))
        }
        Err(e) => Ok(core_error(&e)),
    }
}

async fn generate_sample() -> ActixResult<HttpResponse> {
    let seed = Utc::now().timestamp_nanos_opt().unwrap_or_default() as u64;
    let rows = SyntheticDataset::new(5).with_seed(seed).generate();

    let schema = DatasetSchema::student_performance();
    let mut samples = Vec::with_capacity(rows.len());
    let mut actual_scores = Vec::with_capacity(rows.len());
    for row in rows {
        match schema.split_target(row) {
            Ok((features, score)) => {
                samples.push(features);
                actual_scores.push(score);
            }
            Err(e) => return Ok(core_error(&e)),
        }
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "sample_data": samples,
        "actual_scores": actual_scores,
        "count": samples.len(),
        "note": "Use sample_data for predictions, actual_scores for comparison"
    })))
}
