use wasm_bindgen::JsCast;

use crate::rust_error;
use crate::web_error_handling::JsResult;


pub trait WebElementExt {
    fn set_displayed(&self, displayed: bool) -> JsResult<()>;
    fn set_class(&self, class: &str, on: bool) -> JsResult<()>;

    fn data_attribute(&self, name: &str) -> JsResult<String>;
    fn data_u32(&self, name: &str) -> JsResult<u32>;

    // Moves the element by a CSS transform, animated; `None` puts it back.
    fn set_translation(&self, translation: Option<(f64, f64)>) -> JsResult<()>;
}

impl WebElementExt for web_sys::Element {

    fn set_displayed(&self, displayed: bool) -> JsResult<()> {
        self.set_class("display-none", !displayed)
    }

    fn set_class(&self, class: &str, on: bool) -> JsResult<()> {
        self.class_list().toggle_with_force(class, on)?;
        Ok(())
    }

    fn data_attribute(&self, name: &str) -> JsResult<String> {
        self.get_attribute(&format!("data-{name}"))
            .ok_or_else(|| rust_error!("Missing attribute \"data-{}\"", name))
    }

    fn data_u32(&self, name: &str) -> JsResult<u32> {
        let value = self.data_attribute(name)?;
        value
            .trim()
            .parse()
            .map_err(|_| rust_error!("Attribute \"data-{}\" is not a number: {:?}", name, value))
    }

    fn set_translation(&self, translation: Option<(f64, f64)>) -> JsResult<()> {
        let style = self
            .dyn_ref::<web_sys::HtmlElement>()
            .ok_or_else(|| rust_error!("Cannot move a non-HTML element"))?
            .style();
        match translation {
            Some((dx, dy)) => {
                style.set_property("transform", &format!("translate({dx}px, {dy}px)"))?;
                style.set_property("transition", "transform .3s")?;
            }
            None => {
                style.remove_property("transform")?;
                style.remove_property("transition")?;
            }
        }
        Ok(())
    }
}
