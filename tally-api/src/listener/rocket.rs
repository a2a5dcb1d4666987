// Copyright 2021 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use super::*;
use crate::{
    cache::CacheStore,
    responses::*,
};
use ::rocket::{
    fairing::{
        Fairing,
        Info,
        Kind,
    },
    http::{
        ContentType,
        Method,
    },
    response::{
        content,
        Responder,
    },
    route::{
        self,
        Handler,
    },
    serde::json::{
        self,
        Json,
    },
    Build,
    Data,
    Request,
    Response,
    Rocket,
    Route,
    State,
};
use anyhow::anyhow;
use std::{
    io::Cursor,
    path::PathBuf,
    time::SystemTime,
};
use tally_common::{
    metrics::{
        prometheus::{
            self,
            Encoder,
            TextEncoder,
        },
        INCOMING_REQUESTS,
        REGISTRY,
        RESPONSE_CODE_COLLECTOR,
        RESPONSE_TIME_COLLECTOR,
    },
    types::{
        CacheEntry,
        QueryRequest,
        METHOD_NOT_ALLOWED_MESSAGE,
    },
};

/// Build the listener around `service`. The cache starts empty.
pub fn construct_rocket(service: QueryService) -> Rocket<Build> {
    ::rocket::build()
        .mount("/", routes![options, info, set_cache, get_cache, health, metrics])
        .mount("/", method_not_allowed_routes())
        .manage(service)
        .manage(CacheStore::new())
        .attach(CORS)
        .attach(RequestTimer)
        .register("/", catchers![internal_error, not_found])
}

/// Answers a known path called with an unsupported method
#[derive(Clone, Copy, Debug)]
enum MethodNotAllowed {
    /// `/info` failures always carry the query envelope
    Envelope,
    Bare,
}

#[::rocket::async_trait]
impl Handler for MethodNotAllowed {
    async fn handle<'r>(&self, req: &'r Request<'_>, _data: Data<'r>) -> route::Outcome<'r> {
        match self {
            MethodNotAllowed::Envelope => route::Outcome::from(
                req,
                Envelope::from(QueryResponse::failure(
                    Status::MethodNotAllowed.code,
                    METHOD_NOT_ALLOWED_MESSAGE,
                )),
            ),
            MethodNotAllowed::Bare => route::Outcome::from(req, (Status::MethodNotAllowed, ())),
        }
    }
}

fn method_not_allowed_routes() -> Vec<Route> {
    let unsupported = |allowed: Method| {
        [Method::Get, Method::Post, Method::Put, Method::Delete, Method::Patch]
            .into_iter()
            .filter(move |method| *method != allowed)
    };
    unsupported(Method::Post)
        .map(|method| Route::new(method, "/info", MethodNotAllowed::Envelope))
        .chain(unsupported(Method::Post).map(|method| Route::new(method, "/set", MethodNotAllowed::Bare)))
        .chain(unsupported(Method::Get).map(|method| Route::new(method, "/get", MethodNotAllowed::Bare)))
        .collect()
}

struct CORS;

#[::rocket::async_trait]
impl Fairing for CORS {
    fn info(&self) -> Info {
        Info {
            name: "Add CORS Headers",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, _request: &'r Request<'_>, response: &mut Response<'r>) {
        response.set_raw_header("Access-Control-Allow-Origin", "*");
        response.set_raw_header("Access-Control-Allow-Methods", "GET, POST, OPTIONS");
        response.set_raw_header("Access-Control-Allow-Headers", "*");
    }
}

pub struct RequestTimer;

/// Metric label of a request: its method and the route that matched it.
/// Requests no route matched share a single label.
fn endpoint_label(req: &Request<'_>) -> String {
    let route = req.route().map(|route| route.uri.as_str()).unwrap_or("unmatched");
    format!("{} {}", req.method(), route)
}

#[derive(Copy, Clone)]
struct TimerStart(Option<SystemTime>);

#[::rocket::async_trait]
impl Fairing for RequestTimer {
    fn info(&self) -> Info {
        Info {
            name: "Request Timer",
            kind: Kind::Request | Kind::Response,
        }
    }

    /// Stores the start time of the request in request-local state.
    async fn on_request(&self, request: &mut Request<'_>, _: &mut Data<'_>) {
        request.local_cache(|| TimerStart(Some(SystemTime::now())));
        INCOMING_REQUESTS.inc();
    }

    async fn on_response<'r>(&self, req: &'r Request<'_>, res: &mut Response<'r>) {
        let start_timestamp = req.local_cache(|| TimerStart(None));
        if let Some(Ok(duration)) = start_timestamp.0.map(|st| st.elapsed()) {
            let ms = duration.as_secs_f64() * 1000.0;
            RESPONSE_TIME_COLLECTOR
                .with_label_values(&[&endpoint_label(req)])
                .observe(ms)
        }
        let code = res.status().code;
        let class = match code {
            500..=599 => "500",
            400..=499 => "400",
            300..=399 => "300",
            200..=299 => "200",
            100..=199 => "100",
            _ => return,
        };
        RESPONSE_CODE_COLLECTOR
            .with_label_values(&[&code.to_string(), class])
            .inc();
    }
}

fn json_response(body: &impl Serialize, status: Status) -> ::rocket::response::Result<'static> {
    let string = serde_json::to_string(body).map_err(|e| {
        log::error!("JSON failed to serialize: {:?}", e);
        Status::InternalServerError
    })?;

    Response::build()
        .sized_body(None, Cursor::new(string))
        .status(status)
        .header(ContentType::JSON)
        .ok()
}

impl<'r> Responder<'r, 'static> for ListenerError {
    fn respond_to(self, _req: &'r Request<'_>) -> ::rocket::response::Result<'static> {
        let err = ErrorBody::from(self);
        json_response(&err, err.status)
    }
}

impl<'r> Responder<'r, 'static> for Envelope {
    fn respond_to(self, _req: &'r Request<'_>) -> ::rocket::response::Result<'static> {
        json_response(&self.0, self.status())
    }
}

impl<'r> Responder<'r, 'static> for ListenerResponse {
    fn respond_to(self, req: &'r Request<'_>) -> ::rocket::response::Result<'static> {
        let string = serde_json::to_string(&self).map_err(|e| {
            log::error!("JSON failed to serialize: {:?}", e);
            Status::InternalServerError
        })?;

        content::RawJson(string).respond_to(req)
    }
}

type ListenerResult = Result<ListenerResponse, ListenerError>;

#[options("/<_path..>")]
async fn options(_path: PathBuf) {}

#[post("/info", data = "<request>")]
async fn info(
    service: &State<QueryService>,
    request: Result<Json<QueryRequest>, json::Error<'_>>,
) -> Result<Envelope, ListenerError> {
    let request = request.map_err(|e| ListenerError::BadParse(anyhow!("Invalid request body: {}", e)))?;
    Ok(service.get_info(&request).await.into())
}

#[post("/set", data = "<entry>")]
async fn set_cache(cache: &State<CacheStore>, entry: Result<Json<CacheEntry>, json::Error<'_>>) -> ListenerResult {
    let entry = entry
        .map_err(|e| {
            log::debug!("Rejected cache entry: {}", e);
            ListenerError::EmptyBody
        })?
        .into_inner();
    cache.set(entry.key.as_str(), entry.value.as_str());
    Ok(entry.into())
}

#[get("/get?<key>")]
async fn get_cache(cache: &State<CacheStore>, key: Option<&str>) -> ListenerResult {
    let key = key.filter(|key| !key.is_empty()).ok_or(ListenerError::EmptyQueryParam)?;
    let value = cache.get(key).ok_or(ListenerError::KeyNotFound)?;
    Ok(CacheEntry::new(key, value).into())
}

#[get("/health")]
async fn health(service: &State<QueryService>, cache: &State<CacheStore>) -> ListenerResult {
    Ok(ListenerResponse::Health {
        name: "Tally".into(),
        version: std::env!("CARGO_PKG_VERSION").to_string(),
        is_healthy: service.is_healthy().await,
        cached_entries: cache.len(),
    })
}

#[get("/metrics")]
async fn metrics() -> Result<String, ListenerError> {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder
        .encode(&REGISTRY.gather(), &mut buffer)
        .map_err(|e| ListenerError::Other(e.into()))?;

    let res_custom = String::from_utf8(std::mem::take(&mut buffer)).map_err(|e| ListenerError::Other(e.into()))?;

    encoder
        .encode(&prometheus::gather(), &mut buffer)
        .map_err(|e| ListenerError::Other(e.into()))?;

    let res_default = String::from_utf8(buffer).map_err(|e| ListenerError::Other(e.into()))?;

    Ok(format!("{}{}", res_custom, res_default))
}

#[catch(500)]
fn internal_error() -> ListenerError {
    ListenerError::Other(anyhow!("Internal server error!"))
}

#[catch(404)]
fn not_found() -> ListenerError {
    ListenerError::NotFound
}

#[cfg(test)]
mod tests {
    use super::*;
    use ::rocket::{
        http::Header,
        local::asynchronous::{
            Client,
            LocalResponse,
        },
    };
    use async_trait::async_trait;
    use serde_json::{
        json,
        Value,
    };
    use std::{
        collections::HashSet,
        sync::Arc,
    };
    use tally_common::{
        metrics::prometheus::core::Collector,
        types::{
            CountQuery,
            DATABASE_ERROR_MESSAGE,
        },
    };
    use tally_storage::{
        access::AggregatedRecord,
        repository::{
            CountRepository,
            MemoryRepository,
        },
        StorageError,
    };

    struct BrokenRepository;

    #[async_trait]
    impl CountRepository for BrokenRepository {
        async fn aggregate_counts(&self, _query: &CountQuery) -> Result<Vec<AggregatedRecord>, StorageError> {
            Err(StorageError::Other(anyhow!("connection reset")))
        }

        async fn ping(&self) -> Result<(), StorageError> {
            Err(StorageError::Other(anyhow!("connection reset")))
        }
    }

    fn check_cors_headers(res: &LocalResponse) {
        assert_eq!(
            res.headers().get_one("Access-Control-Allow-Origin"),
            Some(Header::new("Access-Control-Allow-Origin", "*").value())
        );
        assert_eq!(
            res.headers().get_one("Access-Control-Allow-Methods"),
            Some(Header::new("Access-Control-Allow-Methods", "GET, POST, OPTIONS").value())
        );
        assert_eq!(
            res.headers().get_one("Access-Control-Allow-Headers"),
            Some(Header::new("Access-Control-Allow-Headers", "*").value())
        );
        assert_eq!(res.headers().get_one("Access-Control-Allow-Credentials"), None);
    }

    async fn construct_client_with(repository: Arc<dyn CountRepository>) -> Client {
        let rocket = construct_rocket(QueryService::new(repository));
        Client::tracked(rocket).await.expect("Invalid rocket instance!")
    }

    async fn construct_client() -> Client {
        let repository = MemoryRepository::from_json_file("../fixtures/records.json").expect("fixture loads");
        construct_client_with(Arc::new(repository)).await
    }

    async fn json_body(res: LocalResponse<'_>) -> Value {
        serde_json::from_str(&res.into_string().await.expect("No body returned!"))
            .expect("Failed to deserialize response!")
    }

    fn query_body(start_date: &str) -> String {
        json!({
            "startDate": start_date,
            "endDate": "2018-02-02",
            "minCount": 2700,
            "maxCount": 3000,
        })
        .to_string()
    }

    #[::rocket::async_test]
    async fn options() {
        let client = construct_client().await;

        let res = client.options("/anything").dispatch().await;
        assert_eq!(res.status(), Status::Ok);
        assert_eq!(res.content_type(), None);
        check_cors_headers(&res);
        assert!(res.into_string().await.is_none());
    }

    #[::rocket::async_test]
    async fn info() {
        let client = construct_client().await;

        let res = client
            .post("/info")
            .header(ContentType::JSON)
            .body(query_body("2016-01-26"))
            .dispatch()
            .await;
        assert_eq!(res.status(), Status::Ok);
        assert_eq!(res.content_type(), Some(ContentType::JSON));
        check_cors_headers(&res);
        let body = json_body(res).await;
        assert_eq!(body["code"], 0);
        assert_eq!(body["msg"], "Success");
        assert_eq!(
            body["records"],
            json!([
                {"key": "TAKwGc6Jr4i8Z487", "createdAt": "2017-01-28T01:22:14Z", "totalCount": 2800},
                {"key": "cCddT2RdTeH7l4H5", "createdAt": "2016-02-09T06:10:54Z", "totalCount": 2800},
            ])
        );
    }

    #[::rocket::async_test]
    async fn info_invalid_start_date() {
        let client = construct_client().await;

        let res = client
            .post("/info")
            .header(ContentType::JSON)
            .body(query_body("invalidStartDate"))
            .dispatch()
            .await;
        assert_eq!(res.status(), Status::BadRequest);
        check_cors_headers(&res);
        assert_eq!(
            json_body(res).await,
            json!({"code": 400, "msg": "startDate is not in the valid format YYYY-MM-DD", "records": null})
        );
    }

    #[::rocket::async_test]
    async fn info_undecodable_body() {
        let client = construct_client().await;

        let res = client
            .post("/info")
            .header(ContentType::JSON)
            .body("{\"startDate\": 12")
            .dispatch()
            .await;
        assert_eq!(res.status(), Status::BadRequest);
        let body = json_body(res).await;
        assert_eq!(body["code"], 400);
        assert!(body["message"].as_str().unwrap().starts_with("Invalid request body"));
    }

    #[::rocket::async_test]
    async fn info_missing_fields_is_bad_request() {
        let client = construct_client().await;

        for body in ["{}", "{\"startDate\": \"2016-01-26\", \"endDate\": \"2018-02-02\"}"] {
            let res = client.post("/info").header(ContentType::JSON).body(body).dispatch().await;
            assert_eq!(res.status(), Status::BadRequest);
            assert_eq!(json_body(res).await["code"], 400);
        }
    }

    #[::rocket::async_test]
    async fn info_database_failure() {
        let client = construct_client_with(Arc::new(BrokenRepository)).await;

        let res = client
            .post("/info")
            .header(ContentType::JSON)
            .body(query_body("2016-01-26"))
            .dispatch()
            .await;
        assert_eq!(res.status(), Status::InternalServerError);
        assert_eq!(
            json_body(res).await,
            json!({"code": 500, "msg": DATABASE_ERROR_MESSAGE, "records": null})
        );
    }

    #[::rocket::async_test]
    async fn info_wrong_method() {
        let client = construct_client().await;

        for res in [
            client.get("/info").dispatch().await,
            client.put("/info").dispatch().await,
            client.delete("/info").dispatch().await,
        ] {
            assert_eq!(res.status(), Status::MethodNotAllowed);
            assert_eq!(res.content_type(), Some(ContentType::JSON));
            check_cors_headers(&res);
            assert_eq!(
                json_body(res).await,
                json!({"code": 405, "msg": "Method Not Allowed", "records": null})
            );
        }
    }

    #[::rocket::async_test]
    async fn set_then_get() {
        let client = construct_client().await;

        let res = client
            .post("/set")
            .header(ContentType::JSON)
            .body(json!({"key": "active-tabs", "value": "getir"}).to_string())
            .dispatch()
            .await;
        assert_eq!(res.status(), Status::Ok);
        assert_eq!(res.content_type(), Some(ContentType::JSON));
        check_cors_headers(&res);
        assert_eq!(json_body(res).await, json!({"key": "active-tabs", "value": "getir"}));

        let res = client.get("/get?key=active-tabs").dispatch().await;
        assert_eq!(res.status(), Status::Ok);
        let body: ListenerResponse = serde_json::from_value(json_body(res).await).unwrap();
        assert_eq!(body, ListenerResponse::Entry(CacheEntry::new("active-tabs", "getir")));
    }

    #[::rocket::async_test]
    async fn set_empty_body() {
        let client = construct_client().await;

        for body in ["", "not json"] {
            let res = client.post("/set").header(ContentType::JSON).body(body).dispatch().await;
            assert_eq!(res.status(), Status::BadRequest);
            assert_eq!(
                json_body(res).await,
                json!({"code": 400, "message": "request body cannot be empty"})
            );
        }
    }

    #[::rocket::async_test]
    async fn get_without_key() {
        let client = construct_client().await;

        for uri in ["/get", "/get?key="] {
            let res = client.get(uri).dispatch().await;
            assert_eq!(res.status(), Status::BadRequest);
            assert_eq!(
                json_body(res).await,
                json!({"code": 400, "message": "query param cannot be empty"})
            );
        }
    }

    #[::rocket::async_test]
    async fn get_unknown_key() {
        let client = construct_client().await;

        let res = client.get("/get?key=never-set").dispatch().await;
        assert_eq!(res.status(), Status::NotFound);
        check_cors_headers(&res);
        assert_eq!(json_body(res).await, json!({"code": 404, "message": "Key not found"}));
    }

    #[::rocket::async_test]
    async fn cache_wrong_method() {
        let client = construct_client().await;

        for res in [
            client.get("/set").dispatch().await,
            client.delete("/set").dispatch().await,
            client.post("/get").dispatch().await,
            client.put("/get?key=a").dispatch().await,
        ] {
            assert_eq!(res.status(), Status::MethodNotAllowed);
            assert_eq!(res.content_type(), None);
            assert!(res.into_string().await.map_or(true, |body| body.is_empty()));
        }
    }

    #[::rocket::async_test]
    async fn health() {
        let client = construct_client().await;
        client
            .post("/set")
            .header(ContentType::JSON)
            .body(json!({"key": "a", "value": "b"}).to_string())
            .dispatch()
            .await;

        let res = client.get("/health").dispatch().await;
        assert_eq!(res.status(), Status::Ok);
        assert_eq!(res.content_type(), Some(ContentType::JSON));
        match serde_json::from_value(json_body(res).await).expect("Failed to deserialize Health Response!") {
            ListenerResponse::Health {
                is_healthy,
                cached_entries,
                ..
            } => {
                assert!(is_healthy);
                assert_eq!(cached_entries, 1);
            }
            _ => panic!("Did not receive a health response!"),
        }
    }

    #[::rocket::async_test]
    async fn health_reports_broken_store() {
        let client = construct_client_with(Arc::new(BrokenRepository)).await;

        let res = client.get("/health").dispatch().await;
        assert_eq!(res.status(), Status::Ok);
        assert_eq!(json_body(res).await["isHealthy"], false);
    }

    #[::rocket::async_test]
    async fn metrics() {
        let client = construct_client().await;

        let res = client.get("/metrics").dispatch().await;
        assert_eq!(res.status(), Status::Ok);
        assert_eq!(res.content_type(), Some(ContentType::Plain));
    }

    #[::rocket::async_test]
    async fn unknown_route() {
        let client = construct_client().await;

        let res = client.get("/api/anything").dispatch().await;
        assert_eq!(res.status(), Status::NotFound);
        assert_eq!(res.content_type(), Some(ContentType::JSON));
        check_cors_headers(&res);
        assert_eq!(json_body(res).await, json!({"code": 404, "message": "No endpoint found!"}));
    }

    fn response_time_endpoints() -> HashSet<String> {
        let mut endpoints = HashSet::new();
        for family in RESPONSE_TIME_COLLECTOR.collect() {
            for metric in family.get_metric() {
                for label in metric.get_label() {
                    endpoints.insert(label.get_value().to_owned());
                }
            }
        }
        endpoints
    }

    #[::rocket::async_test]
    async fn unknown_paths_share_one_time_series() {
        let client = construct_client().await;

        for i in 0..200 {
            let uri = format!("/random-{}", i);
            let res = client.get(uri.as_str()).dispatch().await;
            assert_eq!(res.status(), Status::NotFound);
        }

        let routes = client
            .rocket()
            .routes()
            .map(|route| route.uri.as_str().to_owned())
            .chain(std::iter::once("unmatched".to_owned()))
            .collect::<HashSet<_>>();
        let endpoints = response_time_endpoints();
        assert!(endpoints.contains("GET unmatched"));
        for endpoint in endpoints {
            let (_, route) = endpoint.split_once(' ').expect("method and route");
            assert!(routes.contains(route), "{:?} is not a mounted route", endpoint);
        }
    }
}
