//! Editor Session Demo
//!
//! Walks the stamping wizard end to end: picks a contract and a seal, places
//! seals on two pages, drags and resizes one of them, prints the request
//! bodies and submits them.
//!
//! Without `SEALDESK_API` the requests go to an in-process backend that
//! accepts everything. With it set, they are POSTed to that server.
//!
//! Run with: cargo run --example editor_session [contract.pdf]
//! Set RUST_LOG=debug to see gesture events.

use async_trait::async_trait;
use stamp_core::{EditorConfig, Point, Seal, Size, StampItem, A4_POINTS};
use stamp_request::{
    ApiResponse, ContractSealRequest, ContractSealResponse, HttpBackend, Operator,
    PerforationSealRequest, StampingBackend,
};
use stamp_workflow::{Contract, Workflow};
use tracing_subscriber::EnvFilter;

/// Rendered page size used for every page
const PAGE_PIXELS: Size = Size {
    width: 600.0,
    height: 800.0,
};

/// Backend that accepts every request without a server
struct DryRunBackend;

#[async_trait]
impl StampingBackend for DryRunBackend {
    async fn seal_contract(
        &self,
        contract_id: i64,
        request: &ContractSealRequest,
    ) -> stamp_request::Result<ApiResponse<ContractSealResponse>> {
        Ok(ApiResponse {
            code: 200,
            message: Some("dry run".to_string()),
            data: Some(ContractSealResponse {
                contract_id,
                seal_count: Some(request.positions.len() as u32),
                ..ContractSealResponse::default()
            }),
            timestamp: None,
            success: None,
        })
    }

    async fn seal_perforation(
        &self,
        contract_id: i64,
        _request: &PerforationSealRequest,
    ) -> stamp_request::Result<ApiResponse<ContractSealResponse>> {
        Ok(ApiResponse {
            code: 200,
            message: Some("dry run".to_string()),
            data: Some(ContractSealResponse {
                contract_id,
                ..ContractSealResponse::default()
            }),
            timestamp: None,
            success: None,
        })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let page_sizes = match std::env::args().nth(1) {
        Some(path) => stamp_core::page_point_sizes(&std::fs::read(&path)?, A4_POINTS)?,
        None => vec![A4_POINTS, A4_POINTS],
    };
    println!("Document has {} page(s)", page_sizes.len());

    let contract = Contract {
        id: 1,
        contract_name: "Demo lease".to_string(),
        file_name: "lease.pdf".to_string(),
        original_url: "/files/lease.pdf".to_string(),
        signed_url: None,
        page_count: page_sizes.len() as u32,
        status: 0,
    };
    let seal: Seal = serde_json::from_str(
        r#"{"id": 7, "sealName": "Company Seal", "sealType": 1, "sealImage": "/uploads/seal/7.png"}"#,
    )?;

    let mut wf = Workflow::new(EditorConfig::default(), Operator::new(1, "demo"));
    wf.select_document(Some(contract));
    wf.go_next()?;
    wf.select_stamp(Some(StampItem::from_seal(&seal)));
    wf.set_stamp_size(100.0);
    wf.go_next()?;

    let engine = wf.engine_mut();
    for (index, points) in page_sizes.iter().enumerate() {
        engine.set_page_geometry(index as u32 + 1, PAGE_PIXELS, Some(*points));
    }

    // Place, then drag the first seal 40px right
    engine.pointer_down(1, Point::new(120.0, 700.0));
    engine.pointer_up();
    engine.click();
    engine.pointer_down(1, Point::new(120.0, 700.0));
    engine.pointer_move(Point::new(160.0, 700.0));
    engine.pointer_up();
    engine.click();

    // Second seal, grown from its bottom-right corner
    engine.pointer_down(1, Point::new(450.0, 700.0));
    if let Some(rect) = engine.placements().get(1).map(|p| p.rect()) {
        engine.pointer_down(1, Point::new(rect.right(), rect.bottom()));
        engine.pointer_move(Point::new(rect.right() + 30.0, rect.bottom() + 10.0));
        engine.pointer_up();
        engine.click();
    }

    if page_sizes.len() > 1 {
        engine.add_placement(2, Point::new(300.0, 400.0));
    }

    for placement in wf.engine().placements() {
        println!(
            "page {} at ({:.0}, {:.0}) size {:.0}x{:.0}",
            placement.page_number, placement.x, placement.y, placement.width, placement.height
        );
    }

    let requests = wf.build_requests();
    println!("{}", serde_json::to_string_pretty(&requests)?);

    let outcome = match std::env::var("SEALDESK_API") {
        Ok(base_url) => wf.submit(&HttpBackend::new(&base_url)?).await?,
        Err(_) => wf.submit(&DryRunBackend).await?,
    };

    println!("{}: {}", if outcome.success { "OK" } else { "FAILED" }, outcome.message);
    println!("Wizard is now at {:?}", wf.step());
    Ok(())
}
