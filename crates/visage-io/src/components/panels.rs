//! The result panel grid: one titled image per existing artifact.

use dioxus::prelude::*;
use visage_session::view::Panel;

/// Props for the [`ResultPanels`] component.
#[derive(Props, Clone, PartialEq)]
pub struct ResultPanelsProps {
    /// Panels in canonical order, as produced by the renderer.
    panels: Vec<Panel>,
}

/// Render the result panels the view description lists, in the order it
/// lists them. This component adds no panels and drops none.
#[component]
pub fn ResultPanels(props: ResultPanelsProps) -> Element {
    rsx! {
        div { class: "result-grid",
            for panel in props.panels {
                div {
                    key: "{panel.kind.label()}",
                    class: "result-container",
                    h2 { "{panel.kind.label()}" }
                    img {
                        src: "{panel.image.url()}",
                        alt: "{panel.kind.label()}",
                    }
                }
            }
        }
    }
}
