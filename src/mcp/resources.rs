//! `wegene://` resources: one per (profile, report) pair

use rmcp::model::{AnnotateAble, RawResource, Resource};
use std::fmt;
use std::str::FromStr;

use crate::catalog::ReportCatalog;
use crate::error::{Error, Result};
use crate::types::{GetReportParams, Profile, ReportDefinition};

pub const URI_SCHEME: &str = "wegene";

const REPORT_MIME_TYPE: &str = "application/json";

/// `wegene://{report_endpoint}/{report_id}/{profile_id}`
///
/// The endpoint may itself contain `/`. Decoding takes the last two path
/// segments as report and profile id and everything before them as the
/// endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportUri {
    pub report_endpoint: String,
    pub report_id: String,
    pub profile_id: String,
}

impl ReportUri {
    pub fn new(report: &ReportDefinition, profile: &Profile) -> Self {
        Self {
            report_endpoint: report.report_endpoint.clone(),
            report_id: report.report_id.clone(),
            profile_id: profile.profile_id.clone(),
        }
    }

    pub fn parse(uri: &str) -> Result<Self> {
        let Some((scheme, rest)) = uri.split_once("://") else {
            return match uri.split_once(':') {
                Some((scheme, _)) if scheme != URI_SCHEME => {
                    Err(Error::UnsupportedScheme(scheme.to_string()))
                }
                _ => Err(Error::InvalidUri(uri.to_string())),
            };
        };
        if scheme != URI_SCHEME {
            return Err(Error::UnsupportedScheme(scheme.to_string()));
        }

        let mut parts = rest.rsplitn(3, '/');
        let profile_id = parts.next().unwrap_or_default();
        let report_id = parts.next().unwrap_or_default();
        let report_endpoint = parts.next().unwrap_or_default();

        // TODO: validate the endpoint against the catalog; "a//b" still passes
        // since only fully empty parts are rejected here.
        if report_endpoint.is_empty() || report_id.is_empty() || profile_id.is_empty() {
            return Err(Error::InvalidUri(uri.to_string()));
        }

        Ok(Self {
            report_endpoint: report_endpoint.to_string(),
            report_id: report_id.to_string(),
            profile_id: profile_id.to_string(),
        })
    }

    pub fn into_params(self) -> GetReportParams {
        GetReportParams {
            report_endpoint: self.report_endpoint,
            report_id: self.report_id,
            profile_id: self.profile_id,
        }
    }
}

impl fmt::Display for ReportUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}://{}/{}/{}",
            URI_SCHEME, self.report_endpoint, self.report_id, self.profile_id
        )
    }
}

impl FromStr for ReportUri {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// A browsable report before it is turned into an MCP resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportResource {
    pub uri: ReportUri,
    pub name: String,
    pub description: String,
}

impl ReportResource {
    fn new(report: &ReportDefinition, profile: &Profile) -> Self {
        Self {
            uri: ReportUri::new(report, profile),
            name: format!(
                "Profile Name: {}; Gender: {}; Report Category: {}; Report Name: {}",
                profile.name, profile.gender, report.category, report.report_name
            ),
            description: format!(
                "Genetic test report of {} for {}",
                report.report_name, profile.name
            ),
        }
    }

    pub fn into_resource(self) -> Resource {
        let mut raw = RawResource::new(self.uri.to_string(), self.name);
        raw.description = Some(self.description);
        raw.mime_type = Some(REPORT_MIME_TYPE.to_string());
        raw.no_annotation()
    }
}

/// Every report applicable to every profile, in profile order
pub fn report_resources(profiles: &[Profile], catalog: &ReportCatalog) -> Vec<ReportResource> {
    profiles
        .iter()
        .flat_map(|profile| {
            catalog
                .for_profile(profile)
                .map(move |report| ReportResource::new(report, profile))
        })
        .collect()
}
