// src/services/enrollment.rs

//! Remote catalog client.
//!
//! Fetches the enrollment packages of one course in a single request and
//! maps each package to an [`ObservedStatus`].

use std::fmt;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::models::{FetcherConfig, ObservedStatus, Status};
use crate::services::StatusFetcher;
use crate::utils::http::create_async_client;

/// Enrollment package as returned by the catalog.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EnrollmentPackage {
    enrollment_class_number: ClassNumber,
    package_enrollment_status: PackageStatus,
    #[serde(default)]
    sections: Vec<PackageSection>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ClassNumber {
    Number(u64),
    Text(String),
}

impl fmt::Display for ClassNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassNumber::Number(n) => write!(f, "{}", n),
            ClassNumber::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Deserialize)]
struct PackageStatus {
    status: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PackageSection {
    subject: Option<Subject>,
    #[serde(default)]
    catalog_number: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Subject {
    short_description: String,
}

/// HTTP client for the remote course catalog.
pub struct EnrollmentClient {
    client: Client,
    config: FetcherConfig,
}

impl EnrollmentClient {
    pub fn new(config: FetcherConfig) -> Result<Self> {
        let client = create_async_client(&config)?;
        Ok(Self { client, config })
    }

    /// Decode a response body into observations for `course_id`.
    fn parse(course_id: &str, body: &str) -> Result<Vec<ObservedStatus>> {
        if body.trim().is_empty() {
            return Err(AppError::fetch(course_id, "empty response body"));
        }

        let packages: Vec<EnrollmentPackage> = serde_json::from_str(body)
            .map_err(|e| AppError::fetch(course_id, format!("invalid response: {}", e)))?;

        let mut observed = Vec::with_capacity(packages.len());
        for package in packages {
            let section_id = package.enrollment_class_number.to_string();
            let Some(status) = Status::from_remote(&package.package_enrollment_status.status)
            else {
                log::warn!(
                    "Skipping section {} of course {}: unknown status {:?}",
                    section_id,
                    course_id,
                    package.package_enrollment_status.status
                );
                continue;
            };

            let (subject_code, catalog_number) = package
                .sections
                .into_iter()
                .next()
                .map(|s| {
                    (
                        s.subject.map(|subj| subj.short_description).unwrap_or_default(),
                        s.catalog_number,
                    )
                })
                .unwrap_or_default();

            observed.push(ObservedStatus {
                subject_code,
                catalog_number,
                section_id,
                course_id: course_id.to_string(),
                status,
            });
        }

        Ok(observed)
    }
}

#[async_trait]
impl StatusFetcher for EnrollmentClient {
    async fn fetch(&self, course_id: &str) -> Result<Vec<ObservedStatus>> {
        let url = self.config.course_url(course_id);
        log::debug!("Fetching course {} from {}", course_id, url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::fetch(course_id, e))?;

        let status = response.status();
        if status == StatusCode::FORBIDDEN || status == StatusCode::TOO_MANY_REQUESTS {
            return Err(AppError::Blocked {
                course_id: course_id.to_string(),
                status: status.as_u16(),
            });
        }
        if !status.is_success() {
            return Err(AppError::fetch(course_id, format!("HTTP {}", status)));
        }

        let body = response
            .text()
            .await
            .map_err(|e| AppError::fetch(course_id, e))?;

        let observed = Self::parse(course_id, &body)?;
        log::debug!(
            "Course {} returned {} section(s)",
            course_id,
            observed.len()
        );
        Ok(observed)
    }
}
