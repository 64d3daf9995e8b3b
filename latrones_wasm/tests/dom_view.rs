use latrones_client::settings::GameSettings;
use latrones_client::test_util::starting_page;
use latrones_wasm::WebClient;
use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);


const CONTROLS: &str = r#"
    <div id="play-overlay"><button id="start-game-btn">Start</button></div>
    <input id="game_time_seconds"><output id="game_time_display"></output>
    <input id="board_size"><output id="board_size_display"></output>
    <input type="radio" name="user_color" value="light"><input type="radio" name="user_color" value="dark">
    <input type="radio" name="play_against_bot" value="true"><input type="radio" name="play_against_bot" value="false">
    <span id="light_time_display"></span><span id="dark_time_display"></span>
    <span id="light_turn_indicator"></span><span id="dark_turn_indicator"></span>
    <span id="winner_display"></span><span id="error_display"></span>
"#;

fn load_page(settings: &GameSettings) {
    let document = web_sys::window().unwrap().document().unwrap();
    let body = document.body().unwrap();
    body.set_inner_html(&format!("{CONTROLS}{}", starting_page(settings)));
}

fn text(id: &str) -> String {
    let document = web_sys::window().unwrap().document().unwrap();
    document.get_element_by_id(id).unwrap().text_content().unwrap_or_default()
}

#[wasm_bindgen_test]
fn initial_page_is_reflected() {
    load_page(&GameSettings {
        time_budget_seconds: 90,
        play_against_bot: false,
        ..GameSettings::default()
    });
    let _client = WebClient::new_client().unwrap();
    assert_eq!(text("light_time_display"), "1:30");
    assert_eq!(text("game_time_display"), "1:30");
    assert_eq!(text("board_size_display"), "8");
    let document = web_sys::window().unwrap().document().unwrap();
    let light = document.get_element_by_id("light_turn_indicator").unwrap();
    assert!(light.class_list().contains("currentturn--light"));
    let checked = document
        .query_selector("input[name=\"play_against_bot\"]:checked")
        .unwrap()
        .unwrap()
        .dyn_into::<web_sys::HtmlInputElement>()
        .unwrap();
    assert_eq!(checked.value(), "false");
}

#[wasm_bindgen_test]
fn click_selects_and_requests_destinations() {
    load_page(&GameSettings { play_against_bot: false, ..GameSettings::default() });
    let mut client = WebClient::new_client().unwrap();
    client.on_square_click(1, 6).unwrap();
    let request = client.next_outgoing_request().unwrap().unwrap();
    assert!(request.contains("\"path\":\"/possible_moves\""), "{request}");
    let document = web_sys::window().unwrap().document().unwrap();
    let selected = document.get_elements_by_class_name("board__square--selected");
    assert_eq!(selected.length(), 1);
    client.on_square_click(3, 6).unwrap();
    assert_eq!(client.next_outgoing_request().unwrap(), None);
}
