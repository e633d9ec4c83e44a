use qconnect_core::QueryRequest;
use qconnect_core::phone;
use qconnect_core::plan::{encode_value, join_values};

/// Build the Patient search for the demographics present on `request`.
///
/// Each present field adds one filter term; absent fields are omitted. Phone
/// candidates are joined as alternative values of a single `phone` term.
pub fn patient_search_path(request: &QueryRequest) -> String {
    let mut terms: Vec<String> = [
        ("given", &request.first_name),
        ("family", &request.last_name),
        ("birthdate", &request.date_of_birth),
        ("identifier", &request.record_number),
    ]
    .into_iter()
    .filter_map(|(name, value)| {
        value
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(|v| format!("{name}={}", encode_value(v)))
    })
    .collect();

    if let Some(raw_phone) = &request.phone {
        let candidates = phone::expand(raw_phone);
        if !candidates.is_empty() {
            terms.push(format!(
                "phone={}",
                join_values(candidates.iter().map(String::as_str))
            ));
        }
    }

    if terms.is_empty() {
        "/Patient".to_string()
    } else {
        format!("/Patient?{}", terms.join("&"))
    }
}
