use console::Style;
use filterscope_core::config::PreviewConfig;
use filterscope_core::filters::FilterSpec;
use filterscope_core::pipeline::{PipelineState, RunSummary};
use filterscope_core::source::SourceRequest;
use filterscope_core::viewport::RenderedView;

struct Styles {
    title: Style,
    header: Style,
    label: Style,
    value: Style,
    method: Style,
    error: Style,
    path: Style,
}

impl Styles {
    fn new() -> Self {
        Self {
            title: Style::new().cyan().bold(),
            header: Style::new().cyan().bold(),
            label: Style::new().dim(),
            value: Style::new().bold().white(),
            method: Style::new().green(),
            error: Style::new().red(),
            path: Style::new().underlined(),
        }
    }
}

pub fn print_preview_summary(config: &PreviewConfig, request: &SourceRequest, filter: &FilterSpec) {
    let s = Styles::new();

    println!();
    println!("  {}", s.title.apply_to("FilterScope Preview"));
    println!("  {}", s.title.apply_to("\u{2550}".repeat(19)));
    println!();

    match request {
        SourceRequest::Static(path) => println!(
            "  {:<14}{}",
            s.label.apply_to("Image"),
            s.path.apply_to(path.display())
        ),
        SourceRequest::Live(index) => {
            println!(
                "  {:<14}{}",
                s.label.apply_to("Camera"),
                s.value.apply_to(index)
            );
            println!(
                "  {:<14}{} ms{}",
                s.label.apply_to("Tick"),
                s.value.apply_to(config.tick_interval_ms),
                if config.threaded_capture { ", threaded" } else { "" }
            );
        }
    }
    println!(
        "  {:<14}{}",
        s.label.apply_to("Filter"),
        s.method.apply_to(filter)
    );
    println!();
}

pub fn print_session_report(
    state: &PipelineState,
    summary: &RunSummary,
    original: Option<&RenderedView>,
    filtered: Option<&RenderedView>,
) {
    let s = Styles::new();

    println!();
    println!("  {}", s.header.apply_to("Session"));
    println!(
        "    {:<12}{}",
        s.label.apply_to("Published"),
        s.value.apply_to(state.stats.publications)
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Passes"),
        s.value.apply_to(state.stats.filter_passes)
    );
    if summary.ticks > 0 {
        println!(
            "    {:<12}{} ({} failed)",
            s.label.apply_to("Ticks"),
            s.value.apply_to(summary.ticks),
            summary.failed
        );
    }

    if let Some(ref pair) = state.frames {
        println!(
            "    {:<12}{}x{} {}",
            s.label.apply_to("Frame"),
            pair.original.width(),
            pair.original.height(),
            s.label.apply_to(pair.original.layout())
        );
        println!(
            "    {:<12}{}",
            s.label.apply_to("Filter"),
            s.method.apply_to(&pair.filter)
        );
    }

    for (name, view) in [("Original", original), ("Filtered", filtered)] {
        if let Some(view) = view {
            println!(
                "    {:<12}{}x{} at ({:.0}, {:.0})",
                s.label.apply_to(name),
                view.width(),
                view.height(),
                view.offset.0,
                view.offset.1
            );
        }
    }

    if let Some(ref e) = state.last_error {
        println!(
            "    {:<12}{}",
            s.label.apply_to("Last error"),
            s.error.apply_to(e)
        );
    }
    println!();
}
