use crate::config::Config;
use futures_util::future::try_join_all;
use headway::{
    feature::{RouteFeatureCollection, StopFeatureCollection},
    source::{
        self, Document, PageConfig, ROUTE_PAGE_CEILING, SHAPE_PAGE_CEILING, STOP_PAGE_CEILING,
        paginate, transit,
    },
};
use reqwest::{
    Client, Url,
    header::{HeaderMap, HeaderValue},
};
use serde_json::Value;
use std::sync::Mutex;
use tracing::debug;

// Route ids per shapes request, keeps the query string short.
const SHAPE_ROUTE_CHUNK: usize = 25;

struct Listing {
    data: Vec<Value>,
    included: Vec<Value>,
}

/// Client for a JSON:API transit feed.
pub struct Upstream {
    client: Client,
    api_url: String,
    route_types: Option<String>,
}

impl Upstream {
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let mut headers = HeaderMap::new();
        if let Some(value) = config
            .api_key
            .as_deref()
            .and_then(|key| HeaderValue::from_str(key).ok())
        {
            headers.insert("x-api-key", value);
        }
        let client = Client::builder().default_headers(headers).build()?;
        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            route_types: config.route_types.clone(),
        })
    }

    async fn get_document(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<Document, source::Error> {
        let url = Url::parse_with_params(&format!("{}{}", self.api_url, path), params)
            .map_err(|err| source::Error::Transport(err.to_string()))?;
        debug!("GET {url}");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| source::Error::Transport(err.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| source::Error::Transport(err.to_string()))?;
        if !status.is_success() {
            return Err(source::Error::UpstreamRequestFailed {
                status: status.as_u16(),
                body,
            });
        }
        Document::parse(&body)
    }

    async fn list(
        &self,
        path: &str,
        filters: &[(&str, String)],
        ceiling: usize,
    ) -> Result<Listing, source::Error> {
        let config = PageConfig::default().with_ceiling(ceiling);
        let included: Mutex<Vec<Value>> = Mutex::new(Vec::new());
        let data = paginate(&config, |offset, limit| {
            let mut params: Vec<(&str, String)> = filters.to_vec();
            params.push(("page[offset]", offset.to_string()));
            params.push(("page[limit]", limit.to_string()));
            let included = &included;
            async move {
                let document = self.get_document(path, &params).await?;
                if let Ok(mut routes) = included.lock() {
                    routes.extend(document.included_of("route"));
                }
                Ok(document.into_page())
            }
        })
        .await?;
        Ok(Listing {
            data,
            included: included.into_inner().unwrap_or_default(),
        })
    }

    /// Every route with its shapes, as route features.
    pub async fn routes(&self) -> Result<RouteFeatureCollection, source::Error> {
        let mut filters: Vec<(&str, String)> = Vec::new();
        if let Some(types) = &self.route_types {
            filters.push(("filter[type]", types.clone()));
        }
        let routes = self.list("/routes", &filters, ROUTE_PAGE_CEILING).await?;
        let ids: Vec<String> = routes
            .data
            .iter()
            .filter_map(|route| route.get("id").and_then(Value::as_str))
            .map(str::to_string)
            .collect();
        if ids.is_empty() {
            return Err(source::Error::NoUsableData("routes".to_string()));
        }

        let listings = try_join_all(ids.chunks(SHAPE_ROUTE_CHUNK).map(|chunk| {
            let filters = vec![
                ("filter[route]", chunk.join(",")),
                ("include", "route".to_string()),
            ];
            async move { self.list("/shapes", &filters, SHAPE_PAGE_CEILING).await }
        }))
        .await?;

        let mut route_records = routes.data;
        let mut shapes: Vec<Value> = Vec::new();
        listings.into_iter().for_each(|listing| {
            shapes.extend(listing.data);
            route_records.extend(listing.included);
        });
        debug!(
            "Fetched {} shapes for {} routes",
            shapes.len(),
            ids.len()
        );
        transit::routes_from_shapes(shapes, route_records)
    }

    pub async fn stops_for_route(
        &self,
        route_id: &str,
    ) -> Result<StopFeatureCollection, source::Error> {
        let filters = [("filter[route]", route_id.to_string())];
        let listing = self.list("/stops", &filters, STOP_PAGE_CEILING).await?;
        transit::stops_from_listing(listing.data)
    }
}
