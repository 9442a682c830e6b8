use base64::Engine;
use milesight_payload::TlvDecoder;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use uplink_worker::domain::UplinkService;
use uplink_worker::uplink_worker::{UplinkWorker, UplinkWorkerConfig, WorkerStats};

// Mock implementations for integration testing
mod mocks {
    use async_trait::async_trait;
    use serde_json::Value;
    use std::sync::Mutex;
    use uplink_worker::domain::{SinkWriter, UplinkResult};

    pub struct CollectingSinkWriter {
        outputs: Mutex<Vec<Value>>,
    }

    impl CollectingSinkWriter {
        pub fn new() -> Self {
            Self {
                outputs: Mutex::new(Vec::new()),
            }
        }

        pub fn outputs(&self) -> Vec<Value> {
            self.outputs.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl SinkWriter for CollectingSinkWriter {
        async fn write(&self, output: &Value) -> UplinkResult<()> {
            self.outputs.lock().unwrap().push(output.clone());
            Ok(())
        }
    }
}

use mocks::CollectingSinkWriter;

fn uplink_document(payload: Option<&[u8]>, f_port: u8) -> String {
    let mut uplink_message = json!({
        "f_port": f_port,
        "f_cnt": 1432,
        "rx_metadata": [
            {"gateway_ids": {"gateway_id": "gw-north"}, "rssi": -104, "snr": 6.5},
            {"gateway_ids": {"gateway_id": "gw-south"}, "rssi": -117, "snr": -3.0}
        ],
        "settings": {
            "data_rate": {"lora": {"bandwidth": 125000, "spreading_factor": 9}},
            "frequency": "868100000"
        }
    });
    if let Some(payload) = payload {
        uplink_message["frm_payload"] =
            json!(base64::engine::general_purpose::STANDARD.encode(payload));
    }

    json!({
        "end_device_ids": {
            "device_id": "em500-smt-field-3",
            "application_ids": {"application_id": "soil-monitoring"},
            "dev_eui": "24E124126B316157"
        },
        "received_at": "2021-06-14T08:30:12.123456789Z",
        "uplink_message": uplink_message
    })
    .to_string()
}

async fn run_pipeline(input: &[u8], emit_errors: bool) -> (WorkerStats, Vec<Value>) {
    let writer = Arc::new(CollectingSinkWriter::new());
    let worker = UplinkWorker::new(
        UplinkService::new(Arc::new(TlvDecoder::em500_smt())),
        writer.clone(),
        UplinkWorkerConfig { emit_errors },
    );

    let stats = worker
        .run(input, CancellationToken::new())
        .await
        .unwrap();

    (stats, writer.outputs())
}

const PERIODIC_FRAME: [u8; 14] = [
    0x01, 0x75, 0x5C, // Battery: 92%
    0x03, 0x67, 0x34, 0x01, // Temperature: 30.8°C
    0x04, 0x68, 0x65, // Moisture: 50.5%
    0x05, 0x7F, 0x0A, 0x00, // Conductivity: 10 µS/cm
];

#[tokio::test]
async fn test_periodic_uplink_becomes_sink_record() {
    let input = uplink_document(Some(&PERIODIC_FRAME), 85);

    let (stats, outputs) = run_pipeline(input.as_bytes(), true).await;

    assert_eq!(stats.records, 1);
    assert_eq!(outputs.len(), 1);

    let output = &outputs[0];
    assert_eq!(
        output["tags"],
        json!({"device_id": "em500-smt-field-3", "dev_eui": "24E124126B316157"})
    );

    let values = &output["values"];
    assert_eq!(values["time"], json!("2021-06-14T08:30:12.123456789Z"));
    assert_eq!(values["battery"], json!(92));
    assert_eq!(values["temperature"], json!(30.8));
    assert_eq!(values["humidity"], json!(50.5));
    assert_eq!(values["conductivity"], json!(10));
    assert_eq!(values["uplinkCount"], json!(1432));
    assert_eq!(values["rssi"], json!(-104.0));
    assert_eq!(values["snr"], json!(6.5));
    assert_eq!(values["bandwidth"], json!(125000));
    assert_eq!(values["spreading_factor"], json!(9));
    assert!(values.get("decode_error").is_none());

    let dewpoint = values["tDewpoint"].as_f64().unwrap();
    assert!((19.0..20.5).contains(&dewpoint), "dewpoint was {dewpoint}");

    // 30.8°C at 50.5% is inside the heat index range and feels warmer
    let heat_index = values["tHeatIndex"].as_f64().unwrap();
    assert!(heat_index > 30.8, "heat index was {heat_index}");
}

#[tokio::test]
async fn test_cool_reading_reports_temperature_as_heat_index() {
    let frame = [
        0x03, 0x67, 0xC8, 0x00, // Temperature: 20.0°C
        0x04, 0x68, 0x64, // Moisture: 50%
    ];
    let input = uplink_document(Some(&frame), 85);

    let (_, outputs) = run_pipeline(input.as_bytes(), true).await;

    assert_eq!(outputs[0]["values"]["tHeatIndex"], json!(20.0));
}

#[tokio::test]
async fn test_missing_payload_emits_error_line() {
    let input = uplink_document(None, 85);

    let (stats, outputs) = run_pipeline(input.as_bytes(), true).await;

    assert_eq!(stats.failed, 1);
    assert_eq!(outputs, vec![json!({"error": "No frm_payload in uplink_message"})]);
}

#[tokio::test]
async fn test_other_port_is_skipped() {
    let input = [
        uplink_document(Some(&[0x01, 0x02]), 10),
        uplink_document(Some(&PERIODIC_FRAME), 85),
    ]
    .join("\n");

    let (stats, outputs) = run_pipeline(input.as_bytes(), true).await;

    assert_eq!(
        stats,
        WorkerStats {
            records: 1,
            skipped: 1,
            failed: 0
        }
    );
    assert_eq!(outputs.len(), 1);
    assert_eq!(outputs[0]["values"]["battery"], json!(92));
}

#[tokio::test]
async fn test_decode_error_keeps_values_read_so_far() {
    let frame = [
        0x01, 0x75, 0x5C, // Battery: 92%
        0x09, 0x99, 0x00, // unknown channel
    ];
    let input = uplink_document(Some(&frame), 85);

    let (stats, outputs) = run_pipeline(input.as_bytes(), true).await;

    assert_eq!(stats.records, 1);
    let values = &outputs[0]["values"];
    assert_eq!(values["battery"], json!(92));
    assert_eq!(values["decode_error"], json!(1));
    assert!(values.get("temperature").is_none());
}

#[tokio::test]
async fn test_invalid_documents_are_dropped_without_error_lines() {
    let input = ["{not json", &uplink_document(None, 85)].join("\n");

    let (stats, outputs) = run_pipeline(input.as_bytes(), false).await;

    assert_eq!(stats.failed, 2);
    assert!(outputs.is_empty());
}

#[tokio::test]
async fn test_non_utf8_line_does_not_stop_the_stream() {
    let mut input = b"{\"bad\":\"\xff\xfe\"}\n".to_vec();
    input.extend_from_slice(uplink_document(Some(&PERIODIC_FRAME), 85).as_bytes());
    input.push(b'\n');

    let (stats, outputs) = run_pipeline(&input, true).await;

    assert_eq!(stats.failed, 1);
    assert_eq!(stats.records, 1);

    assert_eq!(outputs.len(), 2);
    assert!(outputs[0]["error"]
        .as_str()
        .unwrap()
        .starts_with("invalid uplink document"));
    assert_eq!(outputs[1]["values"]["battery"], json!(92));
}
