// src/components/popover.rs
use dioxus::document::eval;
use dioxus::prelude::*;
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::layout::{compute_position, ComputedPosition, PopoverPosition, PositionOptions, Rect};

#[derive(Props, Clone, PartialEq)]
pub struct PopoverProps {
    #[props(default)]
    pub position: PopoverPosition,
    #[props(default = true)]
    pub has_arrow: bool,
    #[props(default)]
    pub match_width: bool,
    #[props(default)]
    pub prevent_overflow: bool,
    #[props(default)]
    pub flip: bool,
    #[props(default)]
    pub class: String,
    pub trigger: Element,
    pub children: Element,
}

async fn measure(element: &Rc<MountedData>) -> Option<Rect> {
    match element.get_client_rect().await {
        Ok(rect) => Some(Rect::new(rect.origin.x, rect.origin.y, rect.size.width, rect.size.height)),
        Err(e) => {
            log::warn!("Failed to measure popover element: {:?}", e);
            None
        }
    }
}

async fn viewport() -> Rect {
    let (width, height) = eval("return [window.innerWidth, window.innerHeight];")
        .join::<(f64, f64)>()
        .await
        .unwrap_or((400.0, 600.0));
    Rect::new(0.0, 0.0, width, height)
}

/// Reports window scroll and resize until told to stop
const TRACK_LAYOUT_JS: &str = r#"
    const notify = () => dioxus.send(true);
    window.addEventListener("scroll", notify, true);
    window.addEventListener("resize", notify);
    await dioxus.recv();
    window.removeEventListener("scroll", notify, true);
    window.removeEventListener("resize", notify);
"#;

/// Floating layers of the open popovers, in the order they were opened
#[derive(Debug, Clone, PartialEq)]
pub struct PortalRegistry<T> {
    next_id: usize,
    entries: BTreeMap<usize, T>,
}

impl<T> Default for PortalRegistry<T> {
    fn default() -> Self {
        Self {
            next_id: 0,
            entries: BTreeMap::new(),
        }
    }
}

impl<T: Clone> PortalRegistry<T> {
    pub fn reserve(&mut self) -> usize {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn insert(&mut self, id: usize, entry: T) {
        self.entries.insert(id, entry);
    }

    pub fn remove(&mut self, id: usize) -> Option<T> {
        self.entries.remove(&id)
    }

    pub fn entries(&self) -> Vec<(usize, T)> {
        self.entries.iter().map(|(id, entry)| (*id, entry.clone())).collect()
    }
}

/// Handle to the root-level layer that popover content renders into
#[derive(Clone, Copy, PartialEq)]
pub struct PopoverPortal {
    registry: Signal<PortalRegistry<Element>>,
}

impl PopoverPortal {
    pub fn new() -> Self {
        Self {
            registry: Signal::new(PortalRegistry::default()),
        }
    }
}

/// Renders every open popover's floating content at the root of the app,
/// outside the clipping and stacking contexts of the page.
#[component]
pub fn PopoverLayer() -> Element {
    let portal = use_context::<PopoverPortal>();
    let entries = portal.registry.read().entries();

    rsx! {
        div {
            class: "popover-layer",
            for (id, content) in entries {
                Fragment { key: "{id}", {content} }
            }
        }
    }
}

/// Moves `children` into the [`PopoverLayer`] while mounted
#[component]
fn PortalIn(children: Element) -> Element {
    let portal = use_context::<PopoverPortal>();
    let mut registry = portal.registry;
    let id = use_hook(move || registry.write().reserve());

    use_effect(use_reactive((&children,), move |(children,)| {
        registry.write().insert(id, children);
    }));
    use_drop(move || {
        if let Ok(mut entries) = registry.try_write() {
            entries.remove(id);
        }
    });

    rsx! {}
}

fn layer_style(position: Option<ComputedPosition>, match_width: Option<f64>) -> String {
    let mut style = match position {
        Some(pos) => format!("position: fixed; left: {}px; top: {}px; z-index: 1050;", pos.x, pos.y),
        // Laid out off screen so it can be measured before it is shown
        None => "position: fixed; left: 0; top: 0; visibility: hidden; z-index: 1050;".to_string(),
    };
    if let Some(width) = match_width {
        style.push_str(&format!(" width: {}px;", width));
    }
    style
}

fn arrow_style(position: &ComputedPosition) -> Option<String> {
    let offset = position.arrow_offset?;
    let style = match position.placement {
        PopoverPosition::Top | PopoverPosition::TopStart | PopoverPosition::TopEnd => {
            format!("left: {}px; bottom: -6px;", offset)
        }
        PopoverPosition::Left | PopoverPosition::LeftStart | PopoverPosition::LeftEnd => {
            format!("top: {}px; right: -6px;", offset)
        }
        PopoverPosition::Right | PopoverPosition::RightStart | PopoverPosition::RightEnd => {
            format!("top: {}px; left: -6px;", offset)
        }
        _ => format!("left: {}px; top: -6px;", offset),
    };
    Some(style)
}

/// Floating content anchored to a trigger element.
///
/// Clicking the trigger toggles the content. When a [`PopoverPortal`] is in
/// context the content renders in the root [`PopoverLayer`], otherwise in a
/// fixed-position layer next to the trigger. The position follows window
/// scroll and resize while open.
#[component]
pub fn Popover(props: PopoverProps) -> Element {
    let portal = try_use_context::<PopoverPortal>();
    let mut is_open = use_signal(|| false);
    let mut reference_el = use_signal(|| None::<Rc<MountedData>>);
    let mut floating_el = use_signal(|| None::<Rc<MountedData>>);
    let mut computed = use_signal(|| None::<ComputedPosition>);
    let mut reference_width = use_signal(|| None::<f64>);
    let mut layout_tick = use_signal(|| 0u32);
    let mut listener_generation = use_signal(|| 0u32);

    let options = PositionOptions {
        placement: props.position,
        prevent_overflow: props.prevent_overflow,
        flip: props.flip,
        arrow: props.has_arrow,
        ..PositionOptions::default()
    };

    use_effect(move || {
        if !is_open() {
            return;
        }
        let generation = *listener_generation.peek() + 1;
        listener_generation.set(generation);
        spawn(async move {
            let mut listener = eval(TRACK_LAYOUT_JS);
            while listener.recv::<bool>().await.is_ok() {
                if !*is_open.peek() || *listener_generation.peek() != generation {
                    let _ = listener.send(serde_json::Value::Bool(true));
                    break;
                }
                *layout_tick.write() += 1;
            }
        });
    });

    use_effect(move || {
        let open = is_open();
        let _ = layout_tick();
        let reference = reference_el.read().clone();
        let floating = floating_el.read().clone();
        if !open {
            computed.set(None);
            return;
        }
        spawn(async move {
            let reference_rect = match &reference {
                Some(el) => measure(el).await,
                None => None,
            };
            let floating_size = match &floating {
                Some(el) => measure(el).await.map(|rect| (rect.width, rect.height)),
                None => None,
            };
            reference_width.set(reference_rect.map(|rect| rect.width));
            computed.set(compute_position(reference_rect, floating_size, viewport().await, &options));
        });
    });

    let popover_class = if is_open() {
        format!("popover popover--open {}", props.class)
    } else {
        format!("popover {}", props.class)
    };
    let width = if props.match_width { reference_width() } else { None };
    let position = computed();
    let style = layer_style(position, width);
    let placement = position.map(|pos| pos.placement).unwrap_or(props.position);

    let children = props.children.clone();
    let floating = is_open().then(move || {
        let layer = rsx! {
            div {
                class: "{popover_class}",
                style: "{style}",
                "data-popper-placement": placement.as_str(),
                onmounted: move |e| floating_el.set(Some(e.data())),
                if let Some(arrow) = position.as_ref().and_then(arrow_style) {
                    div { class: "popover__arrow", style: "{arrow}" }
                }
                {children}
            }
        };
        match portal {
            Some(_) => rsx! { PortalIn { {layer} } },
            None => layer,
        }
    });

    rsx! {
        div {
            class: "popover-trigger",
            onmounted: move |e| reference_el.set(Some(e.data())),
            onclick: move |_| {
                if is_open() {
                    floating_el.set(None);
                }
                is_open.toggle();
            },
            {props.trigger}
        }
        {floating}
    }
}
