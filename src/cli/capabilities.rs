use anyhow::Result;
use console::style;

use docmeta_core::{Capabilities, Capability, ExtractionConfig};

pub fn run(config: &ExtractionConfig) -> Result<()> {
    let caps = Capabilities::probe(config);

    for capability in Capability::ALL {
        let detail = describe(&caps, capability, config);
        if caps.has(capability) {
            eprintln!("{} {:<5} {}", style("●").green(), capability.as_str(), detail);
        } else {
            eprintln!("{} {:<5} {}", style("○").dim(), capability.as_str(), style(detail).dim());
        }
    }

    Ok(())
}

fn describe(caps: &Capabilities, capability: Capability, config: &ExtractionConfig) -> String {
    match capability {
        Capability::Pdf | Capability::Docx => {
            if caps.has(capability) {
                "built in".to_string()
            } else {
                "not compiled in".to_string()
            }
        }
        Capability::Ocr => caps.ocr_binary().map_or_else(
            || format!("'{}' not found on PATH", config.ocr_binary),
            |p| p.display().to_string(),
        ),
        Capability::Ner => match (caps.ner_model(), &config.ner_model_path) {
            (Some(path), _) => path.display().to_string(),
            (None, Some(path)) => format!("no model at {}", path.display()),
            (None, None) => "no model configured".to_string(),
        },
    }
}
