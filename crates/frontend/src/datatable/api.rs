//! HTTP fetchers for Laravel-style endpoints
//!
//! Ready-made `Fetcher`/`Uploader`/`Deleter` handles for callers whose
//! backend speaks `?page=&limit=&sort=` and answers with a paginator.

use contracts::datatable::{PageRequest, PaginatedData};
use contracts::dynamic_form::{Deleter, Fetcher, OneFetcher, Record, TempFile, UploadFile, Uploader};
use contracts::error::FetchError;
use gloo_net::http::{Request, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use wasm_bindgen::JsValue;
use web_sys::{Blob, BlobPropertyBag, FormData};

/// Query string of a page request, without the leading `?`
pub fn page_query(request: &PageRequest) -> Result<String, FetchError> {
    serde_qs::to_string(request).map_err(|e| FetchError::new(format!("Failed to encode query: {}", e)))
}

pub fn page_url(endpoint: &str, request: &PageRequest) -> Result<String, FetchError> {
    let query = page_query(request)?;
    let separator = if endpoint.contains('?') { '&' } else { '?' };
    Ok(format!("{}{}{}", endpoint, separator, query))
}

fn js_error(context: &str, err: JsValue) -> FetchError {
    FetchError::new(format!("{}: {:?}", context, err))
}

/// Decode a successful response, or turn an error status into a `FetchError`
/// carrying the decoded body
async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, FetchError> {
    if !response.ok() {
        let status = response.status();
        let error = FetchError::new(format!("HTTP error: {}", status));
        return Err(match response.json::<Value>().await {
            Ok(body) => error.with_response(body),
            Err(_) => error,
        });
    }
    response
        .json()
        .await
        .map_err(|e| FetchError::new(format!("Failed to parse response: {}", e)))
}

/// GET `endpoint?page=..` for every page request
pub fn http_fetcher(endpoint: impl Into<String>) -> Fetcher {
    let endpoint = endpoint.into();
    Fetcher::new(move |request: PageRequest| {
        let url = page_url(&endpoint, &request);
        async move {
            let url = url?;
            log::debug!("GET {}", url);
            let response = Request::get(&url)
                .send()
                .await
                .map_err(|e| FetchError::new(format!("Request failed: {}", e)))?;
            read_json::<PaginatedData<Record>>(response).await
        }
    })
}

/// GET `endpoint/{value}` to resolve one record
pub fn http_one_fetcher(endpoint: impl Into<String>) -> OneFetcher {
    let endpoint = endpoint.into();
    OneFetcher::new(move |value: Value| {
        let url = format!("{}/{}", endpoint, contracts::dynamic_form::value::to_display_string(&value));
        async move {
            let response = Request::get(&url)
                .send()
                .await
                .map_err(|e| FetchError::new(format!("Request failed: {}", e)))?;
            read_json::<Record>(response).await
        }
    })
}

fn form_data(file: &UploadFile) -> Result<FormData, FetchError> {
    let bytes = js_sys::Uint8Array::from(file.bytes.as_slice());
    let parts = js_sys::Array::of1(&bytes);
    let options = BlobPropertyBag::new();
    options.set_type(&file.mime_type);
    let blob = Blob::new_with_u8_array_sequence_and_options(&parts, &options)
        .map_err(|e| js_error("Failed to build file", e))?;

    let data = FormData::new().map_err(|e| js_error("Failed to build form data", e))?;
    data.append_with_blob_and_filename("file", &blob, &file.name)
        .map_err(|e| js_error("Failed to build form data", e))?;
    Ok(data)
}

/// POST the file as multipart `file` field; the backend answers with the temp file
pub fn http_uploader(endpoint: impl Into<String>) -> Uploader {
    let endpoint = endpoint.into();
    Uploader::new(move |file: UploadFile| {
        let endpoint = endpoint.clone();
        async move {
            let body = form_data(&file)?;
            let request = Request::post(&endpoint)
                .body(body)
                .map_err(|e| FetchError::new(format!("Failed to build request: {}", e)))?;
            let response = request
                .send()
                .await
                .map_err(|e| FetchError::new(format!("Request failed: {}", e)))?;
            read_json::<TempFile>(response).await
        }
    })
}

/// DELETE `endpoint/{id}`
pub fn http_deleter(endpoint: impl Into<String>) -> Deleter {
    let endpoint = endpoint.into();
    Deleter::new(move |id: u64| {
        let url = format!("{}/{}", endpoint, id);
        async move {
            let response = Request::delete(&url)
                .send()
                .await
                .map_err(|e| FetchError::new(format!("Request failed: {}", e)))?;
            if response.ok() {
                Ok(())
            } else {
                read_json::<Value>(response).await.map(|_| ())
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_page_query() {
        let mut request = PageRequest::new(2, 10);
        request.sort = Some("-name".to_string());
        request.search = Some("riz".to_string());

        let query = page_query(&request).unwrap();
        assert!(query.starts_with("page=2&limit=10"));
        assert!(query.contains("sort=-name"));
        assert!(query.contains("search=riz"));
        assert!(!query.contains("filter"));
    }

    #[test]
    fn test_page_query_filters_decode_back() {
        let mut request = PageRequest::new(1, 25);
        request.filter = Some(BTreeMap::from([("status".to_string(), "active".to_string())]));

        let query = page_query(&request).unwrap();
        let decoded: PageRequest = serde_qs::from_str(&query).unwrap();
        assert_eq!(decoded, request);
    }

    #[test]
    fn test_page_url_separator() {
        let request = PageRequest::new(1, 10);
        assert_eq!(page_url("/api/products", &request).unwrap(), "/api/products?page=1&limit=10");
        assert_eq!(
            page_url("/api/products?type=food", &request).unwrap(),
            "/api/products?type=food&page=1&limit=10"
        );
    }
}
