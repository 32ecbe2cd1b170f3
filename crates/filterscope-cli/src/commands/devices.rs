use anyhow::Result;

#[cfg(feature = "camera")]
pub fn run() -> Result<()> {
    use anyhow::Context;
    use console::Style;
    use filterscope_core::capture::camera::list_devices;

    let devices = list_devices().context("Failed to query capture devices")?;
    if devices.is_empty() {
        println!("No capture devices found");
        return Ok(());
    }

    let index = Style::new().cyan().bold();
    let dim = Style::new().dim();
    for device in devices {
        println!(
            "  {:>3}  {}  {}",
            index.apply_to(device.index),
            device.name,
            dim.apply_to(&device.description)
        );
    }
    Ok(())
}

#[cfg(not(feature = "camera"))]
pub fn run() -> Result<()> {
    anyhow::bail!("filterscope was built without camera support; rebuild with `--features camera`")
}
