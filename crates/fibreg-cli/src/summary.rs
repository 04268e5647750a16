use std::time::Duration;

use console::Style;
use fibreg_core::pipeline::config::{BatchConfig, ExperimentConfig, Task};
use fibreg_core::pipeline::ExperimentReport;

struct Styles {
    title: Style,
    header: Style,
    label: Style,
    value: Style,
    method: Style,
    disabled: Style,
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
            disabled: Style::new().dim().yellow(),
            path: Style::new().underlined(),
        }
    }
}

fn on_off(s: &Styles, enabled: bool) -> String {
    if enabled {
        s.method.apply_to("on").to_string()
    } else {
        s.disabled.apply_to("off").to_string()
    }
}

pub fn print_batch_summary(config: &BatchConfig) {
    let s = Styles::new();

    println!();
    println!("  {}", s.title.apply_to(format!("fibreg {}", config.task)));
    println!("  {}", s.title.apply_to("\u{2550}".repeat(20)));
    println!();

    let workers = config
        .workers
        .map(|n| n.to_string())
        .unwrap_or_else(|| "all cores".into());
    println!("  {:<14}{}", s.label.apply_to("Workers"), s.value.apply_to(workers));
    println!(
        "  {:<14}{}",
        s.label.apply_to("Extension"),
        s.value.apply_to(&config.extension)
    );

    match config.task {
        Task::Preprocessing => {
            let p = &config.preprocessing;
            println!("  {:<14}{}", s.label.apply_to("Crop"), on_off(&s, p.crop));
            if p.crop {
                println!("    {:<12}{}", s.label.apply_to("Padding"), s.value.apply_to(p.padding));
            }
            println!("  {:<14}{}", s.label.apply_to("Normalize"), on_off(&s, p.normalize));
            if p.normalize {
                println!(
                    "    {:<12}{}",
                    s.label.apply_to("Smoothing"),
                    s.value.apply_to(p.mean_smoothing)
                );
            }
            println!("  {:<14}{}", s.label.apply_to("Invert"), on_off(&s, p.invert));
        }
        Task::Registration => {
            let r = &config.registration;
            println!(
                "  {:<14}{}",
                s.label.apply_to("Upsample"),
                s.value.apply_to(format!("1/{} px", r.upsample_factor))
            );
            println!(
                "  {:<14}{}",
                s.label.apply_to("Mask step"),
                s.value.apply_to(format!("{} px", r.mask_crop_step))
            );
        }
    }
    println!();

    println!("  {}", s.header.apply_to("Experiments"));
    for (i, exp) in config.experiments.iter().enumerate() {
        let range = match exp.crop_end {
            Some(end) => format!("[{}, {})", exp.crop_start, end),
            None if exp.crop_start > 0 => format!("[{}, end)", exp.crop_start),
            None => "all".into(),
        };
        println!(
            "    {:<4}{} \u{2192} {}  {}",
            s.label.apply_to(i + 1),
            s.path.apply_to(exp.load_path.display()),
            s.path.apply_to(exp.save_path.display()),
            s.label.apply_to(range)
        );
    }
    println!();
}

pub fn print_experiment_report(report: &ExperimentReport, experiment: &ExperimentConfig) {
    let s = Styles::new();

    println!(
        "  {} {}",
        s.header.apply_to(format!("Experiment {}", report.index)),
        s.path.apply_to(experiment.save_path.display())
    );
    println!("    {:<12}{}", s.label.apply_to("Slices"), s.value.apply_to(report.frames));
    if let Some(polarity) = report.polarity {
        println!("    {:<12}{}", s.label.apply_to("Polarity"), s.value.apply_to(polarity));
    }
    if let Some(bounds) = report.bounds {
        println!("    {:<12}{}", s.label.apply_to("Bounds"), s.value.apply_to(bounds));
    }
    if let Some(last) = report.translations.as_ref().and_then(|t| t.last()) {
        println!(
            "    {:<12}{}",
            s.label.apply_to("Total drift"),
            s.value.apply_to(format!("dy {:+.2}, dx {:+.2}", last.dy, last.dx))
        );
    }
    println!(
        "    {:<12}{}",
        s.label.apply_to("Elapsed"),
        s.value.apply_to(format!("{:.2}s", report.elapsed.as_secs_f64()))
    );
}

pub fn print_batch_total(experiments: usize, elapsed: Duration) {
    let s = Styles::new();
    println!();
    println!(
        "  {} {} experiment(s) in {}",
        s.title.apply_to("Done:"),
        s.value.apply_to(experiments),
        s.value.apply_to(format!("{:.2}s", elapsed.as_secs_f64()))
    );
}
