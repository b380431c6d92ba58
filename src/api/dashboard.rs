use std::collections::BTreeMap;

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use super::AppState;
use crate::auth::{Capability, Principal};
use crate::error::ApiError;
use crate::models::{Booking, BookingStatus, Lead, LeadStatus, Property};
use crate::records::{Repository, Stored};

pub fn router() -> Router<AppState> {
    Router::new().route("/api/dashboard/stats", get(stats))
}

/// Back-office counters
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_properties: usize,
    pub total_leads: usize,
    pub total_bookings: usize,
    pub featured_properties: usize,
    pub leads_by_status: BTreeMap<&'static str, usize>,
    pub bookings_by_status: BTreeMap<&'static str, usize>,
}

impl DashboardStats {
    pub fn compute(properties: &[Property], leads: &[Lead], bookings: &[Booking]) -> Self {
        let mut leads_by_status: BTreeMap<_, _> =
            LeadStatus::ALL.iter().map(|s| (s.as_str(), 0)).collect();
        for lead in leads {
            *leads_by_status.entry(lead.status.as_str()).or_default() += 1;
        }

        let mut bookings_by_status: BTreeMap<_, _> =
            BookingStatus::ALL.iter().map(|s| (s.as_str(), 0)).collect();
        for booking in bookings {
            *bookings_by_status.entry(booking.status.as_str()).or_default() += 1;
        }

        Self {
            total_properties: properties.len(),
            total_leads: leads.len(),
            total_bookings: bookings.len(),
            featured_properties: properties.iter().filter(|p| p.featured).count(),
            leads_by_status,
            bookings_by_status,
        }
    }
}

async fn stats(
    principal: Principal,
    State(repo): State<Repository>,
) -> Result<Json<DashboardStats>, ApiError> {
    principal.require(Capability::ViewDashboard)?;

    let properties = records(repo.list::<Property>().await?);
    let leads = records(repo.list::<Lead>().await?);
    let bookings = records(repo.list::<Booking>().await?);

    Ok(Json(DashboardStats::compute(&properties, &leads, &bookings)))
}

fn records<T>(stored: Vec<Stored<T>>) -> Vec<T> {
    stored.into_iter().map(Stored::into_record).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_totals_featured_and_statuses() {
        let properties = vec![
            Property {
                featured: true,
                ..Property::default()
            },
            Property::default(),
        ];
        let leads = vec![
            Lead::default(),
            Lead {
                status: LeadStatus::Lost,
                ..Lead::default()
            },
            Lead::default(),
        ];
        let bookings = vec![Booking {
            status: BookingStatus::Confirmed,
            ..Booking::default()
        }];

        let stats = DashboardStats::compute(&properties, &leads, &bookings);

        assert_eq!(stats.total_properties, 2);
        assert_eq!(stats.featured_properties, 1);
        assert_eq!(stats.total_leads, 3);
        assert_eq!(stats.total_bookings, 1);
        assert_eq!(stats.leads_by_status["new"], 2);
        assert_eq!(stats.leads_by_status["lost"], 1);
        assert_eq!(stats.leads_by_status["qualified"], 0);
        assert_eq!(stats.bookings_by_status["confirmed"], 1);
        assert_eq!(stats.bookings_by_status["pending"], 0);
    }
}
