use pageprint_printing::{
    DeviceCall, DeviceCap, DeviceSettings, DuplexMode, JobState, Orientation, PaperSetting,
    PrintError, PrintJob, PrintJobConfiguration, PrinterDescriptor, PrinterDirectory,
    RecordingDevice, Setting,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn office_device() -> RecordingDevice {
    RecordingDevice::new()
        .with_printer(PrinterDescriptor::new("Zeta").with_description("Zeta,Laser,"))
        .with_printer(PrinterDescriptor::new("Alpha"))
        .with_default_printer("Default")
        .with_defaults(DeviceSettings {
            paper_size: 1,
            orientation: 1,
            duplex: 2,
        })
}

#[test]
fn landscape_test_page_end_to_end() {
    init_tracing();
    let device = office_device();
    let config = PrintJobConfiguration::new().with_orientation(Orientation::Landscape);
    let mut job = PrintJob::new(device.clone(), config);

    job.open(None).unwrap();
    job.set_font("Arial", 32.0, false).unwrap();
    job.text([72.0, 72.0], "Testing...").unwrap();
    job.text([72.0, 72.0 + 48.0], "Testing #2").unwrap();
    job.rectangle([72.0, 72.0, 72.0 * 6.0, 72.0 * 3.0]).unwrap();
    job.line([72.0, 72.0], [72.0 * 6.0, 72.0 * 3.0]).unwrap();
    job.close().unwrap();

    assert_eq!(job.state(), JobState::Closed);
    assert_eq!(job.printer(), Some("Default"));
    assert!(device.live_handles().is_empty());

    let calls = device.calls();
    assert!(calls.contains(&DeviceCall::CreateContext {
        printer: "Default".into(),
        settings: DeviceSettings {
            paper_size: 1,
            orientation: 2,
            duplex: 2,
        },
    }));
    assert!(calls.contains(&DeviceCall::TextOut {
        point: [1440, -2400],
        text: "Testing #2".into(),
    }));

    let page_starts = calls.iter().filter(|call| **call == DeviceCall::StartPage).count();
    let page_ends = calls.iter().filter(|call| **call == DeviceCall::EndPage).count();
    assert_eq!((page_starts, page_ends), (1, 1));
    assert!(matches!(calls.last(), Some(DeviceCall::DeleteFont(_))));
}

#[test]
fn multi_page_job_counts_pages() {
    let device = office_device();
    let mut job = PrintJob::new(device.clone(), PrintJobConfiguration::new());
    assert_eq!(job.page(), 0);
    for page in 1..=3 {
        job.text([36.0, 36.0], &format!("page {page}")).unwrap();
        assert_eq!(job.page(), page);
        job.end_page().unwrap();
    }
    assert_eq!(job.page(), 4);
    job.close().unwrap();

    let calls = device.calls();
    let page_ends = calls.iter().filter(|call| **call == DeviceCall::EndPage).count();
    assert_eq!(page_ends, 3);
    assert_eq!(calls.iter().filter(|call| **call == DeviceCall::EndDoc).count(), 1);
}

#[test]
fn unknown_paper_fails_before_any_device_is_opened() {
    let device = office_device();
    let err = PrintJobConfiguration::from_mnemonics(None, Some("banana"), None, None).unwrap_err();
    assert_eq!(err.setting, Setting::PaperSize);
    assert_eq!(device.open_count(), 0);

    let err: PrintError = err.into();
    assert!(matches!(err, PrintError::Configuration(_)));
    assert!(device.calls().is_empty());
}

#[test]
fn raw_paper_code_and_duplex_alias_reach_the_device() {
    let device = office_device();
    let config = PrintJobConfiguration::new()
        .with_printer("Alpha")
        .with_paper(PaperSetting::Code(70))
        .with_duplex("normal".parse::<DuplexMode>().unwrap());
    let mut job = PrintJob::new(device.clone(), config);
    job.open(Some("codes")).unwrap();
    assert!(device.calls().contains(&DeviceCall::CreateContext {
        printer: "Alpha".into(),
        settings: DeviceSettings {
            paper_size: 70,
            orientation: 1,
            duplex: 1,
        },
    }));
    job.close().unwrap();
}

#[test]
fn printable_size_from_device_capabilities() {
    let device = office_device()
        .with_capability(DeviceCap::HorizontalResolution, 8500)
        .with_capability(DeviceCap::HorizontalDpi, 600)
        .with_capability(DeviceCap::VerticalResolution, 6000)
        .with_capability(DeviceCap::VerticalDpi, 600);
    let mut job = PrintJob::new(device, PrintJobConfiguration::new());
    let (width, height) = job.printable_size().unwrap();
    assert_eq!(width, 1020.0);
    assert_eq!(height, 720.0);
    assert_eq!(job.state(), JobState::Open);
}

#[test]
fn directory_lists_default_first() {
    let directory = PrinterDirectory::new(office_device());
    assert_eq!(
        directory.list_printers().unwrap(),
        vec!["Default", "Alpha", "Zeta"]
    );
    assert_eq!(
        directory.describe("Zeta").unwrap().description,
        "Zeta,Laser,"
    );
    assert!(matches!(
        directory.describe("Ghost"),
        Err(PrintError::UnknownDevice(_))
    ));
}

#[test]
fn missing_printer_is_reported_as_unavailable() {
    let device = office_device();
    let mut job = PrintJob::new(
        device.clone(),
        PrintJobConfiguration::new().with_printer("Ghost"),
    );
    let err = job.text([0.0, 0.0], "never printed").unwrap_err();
    assert!(matches!(err, PrintError::DeviceUnavailable { .. }));
    assert_eq!(job.state(), JobState::Unopened);
    assert!(device.live_handles().is_empty());
}

#[cfg(feature = "raster")]
#[test]
fn image_is_blitted_with_flipped_destination() {
    use image::{codecs::png::PngEncoder, ColorType, ImageEncoder};

    let mut png = Vec::new();
    PngEncoder::new(&mut png)
        .write_image(&[0u8; 4 * 4 * 4], 4, 4, ColorType::Rgba8)
        .unwrap();

    let device = office_device();
    let mut job = PrintJob::new(device.clone(), PrintJobConfiguration::new());
    job.image([72.0, 72.0], &png, [144.0, 72.0]).unwrap();
    assert_eq!(job.state(), JobState::Open);
    assert!(device.calls().contains(&DeviceCall::Blit {
        width: 4,
        height: 4,
        dest: [1440, -1440, 4320, -2880],
    }));

    let err = job.image([0.0, 0.0], b"definitely not png", [1.0, 1.0]).unwrap_err();
    assert!(matches!(err, PrintError::Image(_)));
    job.close().unwrap();
}
