use colored::Colorize;
use qconnect_core::{QueryShape, UseCase};

pub fn list() {
    for use_case in UseCase::ALL {
        let shape = match use_case.query_shape() {
            QueryShape::Social => "social history",
            QueryShape::ObservationOnly => "observations",
            QueryShape::General => "labs, conditions, medications, encounters",
        };
        let second_pass = if use_case.has_second_pass_query() {
            " + linked encounters"
        } else {
            ""
        };
        println!(
            "{}  {}  {}",
            use_case.id().cyan(),
            use_case.display_name(),
            format!("({shape}{second_pass})").dimmed()
        );
    }
}
