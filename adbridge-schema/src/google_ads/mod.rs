use serde::{Deserialize, Serialize};

/// `GET /customers:listAccessibleCustomers` response.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListAccessibleCustomersResponse {
    #[serde(default)]
    pub resource_names: Vec<String>,
}

impl ListAccessibleCustomersResponse {
    /// Customer id of the first accessible resource (`customers/1234567890` -> `1234567890`).
    pub fn first_customer_id(&self) -> Option<&str> {
        self.resource_names
            .first()
            .map(|name| name.rsplit('/').next().unwrap_or(name.as_str()))
            .filter(|id| !id.is_empty())
    }
}

/// `POST /customers/{id}/googleAds:search` request.
#[derive(Debug, Clone, Serialize)]
pub struct GoogleAdsSearchRequest<'a> {
    pub query: &'a str,
}

/// `POST /customers/{id}/googleAds:search` response, reduced to the customer row.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct GoogleAdsSearchResponse {
    #[serde(default)]
    pub results: Vec<GoogleAdsSearchRow>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct GoogleAdsSearchRow {
    #[serde(default)]
    pub customer: Option<GoogleAdsCustomer>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleAdsCustomer {
    #[serde(default)]
    pub resource_name: Option<String>,
    #[serde(default)]
    pub descriptive_name: Option<String>,
    #[serde(default)]
    pub currency_code: Option<String>,
}

impl GoogleAdsSearchResponse {
    pub fn customer(&self) -> Option<&GoogleAdsCustomer> {
        self.results.iter().find_map(|row| row.customer.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn first_customer_id_strips_resource_prefix() {
        let resp: ListAccessibleCustomersResponse = serde_json::from_value(json!({
            "resourceNames": ["customers/1234567890", "customers/42"]
        }))
        .unwrap();
        assert_eq!(resp.first_customer_id(), Some("1234567890"));

        let empty = ListAccessibleCustomersResponse::default();
        assert_eq!(empty.first_customer_id(), None);
    }

    #[test]
    fn search_response_exposes_customer_row() {
        let resp: GoogleAdsSearchResponse = serde_json::from_value(json!({
            "results": [{
                "customer": {
                    "resourceName": "customers/42",
                    "descriptiveName": "Acme Shoes",
                    "currencyCode": "EUR"
                }
            }],
            "fieldMask": "customer.descriptiveName,customer.currencyCode"
        }))
        .unwrap();
        let customer = resp.customer().expect("customer row");
        assert_eq!(customer.descriptive_name.as_deref(), Some("Acme Shoes"));
        assert_eq!(customer.currency_code.as_deref(), Some("EUR"));
    }
}
