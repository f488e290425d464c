//! The three-angle rotate form.
//!
//! Seeded from the last accepted rotation so repeated submits iterate
//! from where the previous one landed. Angles are soft-bounded by the
//! input attributes only; whatever is typed is submitted as-is.

use dioxus::prelude::*;
use visage_session::state::{ImageHandle, Rotation};

/// Props for the [`RotateForm`] component.
#[derive(Props, Clone, PartialEq)]
pub struct RotateFormProps {
    /// Seed values for the three angle inputs.
    rotation: Rotation,
    /// The artifact the next submit will reprocess.
    image: ImageHandle,
    /// Called with the angles exactly as entered.
    on_submit: EventHandler<Rotation>,
    /// Called when the user leaves the form for the result view.
    on_close: EventHandler<()>,
}

/// Parse an angle input, treating anything unparseable as zero.
fn parse_angle(raw: &str) -> f64 {
    raw.trim().parse().unwrap_or(0.0)
}

/// The editable rotate form with a preview of the image it reprocesses.
#[component]
pub fn RotateForm(props: RotateFormProps) -> Element {
    let mut x = use_signal(|| props.rotation.x.to_string());
    let mut y = use_signal(|| props.rotation.y.to_string());
    let mut z = use_signal(|| props.rotation.z.to_string());

    let submit = move |_| {
        props
            .on_submit
            .call(Rotation::new(parse_angle(&x()), parse_angle(&y()), parse_angle(&z())));
    };

    rsx! {
        div { class: "rotate-form",
            div { class: "result-container",
                h2 { "Rotate" }
                img { src: "{props.image.url()}", alt: "Current image" }
            }

            div { class: "rotate-inputs",
                label { "X (pitch)"
                    input {
                        r#type: "number",
                        min: "-180",
                        max: "180",
                        value: "{x}",
                        oninput: move |evt| x.set(evt.value()),
                    }
                }
                label { "Y (yaw)"
                    input {
                        r#type: "number",
                        min: "-180",
                        max: "180",
                        value: "{y}",
                        oninput: move |evt| y.set(evt.value()),
                    }
                }
                label { "Z (roll)"
                    input {
                        r#type: "number",
                        min: "-180",
                        max: "180",
                        value: "{z}",
                        oninput: move |evt| z.set(evt.value()),
                    }
                }
            }

            div { class: "rotate-actions",
                button { class: "menu-item", onclick: submit, "Apply Rotation" }
                button {
                    class: "menu-item",
                    onclick: move |_| props.on_close.call(()),
                    "Back to Results"
                }
            }
        }
    }
}
