//! Command handlers grouped by resource.
//!
//! Layout: `plan.rs` (deployment plans), `pod.rs` (pods), `service.rs`
//! (endpoints, state, and configurations), `package.rs` (package registry
//! calls).

pub(crate) mod package;
pub(crate) mod plan;
pub(crate) mod pod;
pub(crate) mod service;

use crate::client::{AppContext, CliResult, QueryRequest, ResponseCheck};
use crate::output::pretty_json;

/// Run `request` through the session and return the response body.
pub(crate) async fn fetch(
    ctx: &AppContext,
    request: &QueryRequest,
    check: Option<&dyn ResponseCheck>,
) -> CliResult<Vec<u8>> {
    Ok(ctx.executor.query(request, check).await?)
}

/// Fetch a service-scoped `GET` path and return it as pretty JSON.
pub(crate) async fn fetch_service_json(ctx: &AppContext, path: &str) -> CliResult<String> {
    let request = QueryRequest::get(ctx.service_scope(), path);
    let body = fetch(ctx, &request, None).await?;
    Ok(pretty_json(&body))
}


#[cfg(test)]
mod tests {
    use super::test_support::{AUTH_HEADER, context_for};
    use super::*;
    use httpmock::prelude::*;

    #[tokio::test]
    async fn service_json_is_pretty_printed() -> anyhow::Result<()> {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/service/hello-world/v1/endpoints")
                .header("authorization", AUTH_HEADER);
            then.status(200).body(r#"["broker","zookeeper"]"#);
        });

        let ctx = context_for(&server);
        let text = fetch_service_json(&ctx, "v1/endpoints")
            .await
            .map_err(|err| anyhow::anyhow!(err.display_message()))?;

        mock.assert();
        assert_eq!(text, "[\n  \"broker\",\n  \"zookeeper\"\n]");
        Ok(())
    }
}
