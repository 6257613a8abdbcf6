mod common;

use common::{ADMIN, AZIZ, Harness, message_to};
use order_bot::{RecordStore, SessionStore};
use order_bot::engine::{menu, texts};
use rust_decimal::Decimal;
use shared::models::{OrderStatus, Product, Role};

#[tokio::test]
async fn test_registration_creates_customer_with_zero_bonus() {
    let h = Harness::new();

    // 1. Unregistered user is asked to save data
    let out = h.say(AZIZ, "/start").await;
    assert_eq!(out[0].text, texts::PLEASE_REGISTER);

    // 2. Walk through the steps
    assert_eq!(h.say(AZIZ, menu::SAVE_DATA).await[0].text, texts::ENTER_NAME);
    assert_eq!(h.say(AZIZ, "Aziz").await[0].text, texts::ENTER_PHONE);
    assert_eq!(h.say(AZIZ, "+998901234567").await[0].text, texts::SEND_LOCATION);
    assert_eq!(h.locate(AZIZ, 41.3, 69.2).await[0].text, texts::CHOOSE_ROLE);
    let out = h.say(AZIZ, "Usta").await;
    assert_eq!(out[0].text, texts::REGISTERED);
    assert_eq!(out[0].keyboard, Some(menu::customer_menu(Role::Contractor)));

    // 3. Stored record
    let customer = h.store.find_customer(AZIZ).await.unwrap().unwrap();
    assert_eq!(customer.name, "Aziz");
    assert_eq!(customer.phone, "+998901234567");
    assert_eq!(customer.address, "Lat:41.3 Lon:69.2");
    assert_eq!(customer.role, Role::Contractor);
    assert_eq!(customer.bonus, Decimal::ZERO);

    // 4. Finished dialogue leaves no session behind
    assert!(h.sessions.is_empty());

    // 5. Balance
    let out = h.say(AZIZ, menu::TOTAL_BONUS).await;
    assert_eq!(out[0].text, "Sizning umumiy bonusingiz: 0 so'm");
}

#[tokio::test]
async fn test_invalid_phone_stays_on_phone_step() {
    let h = Harness::new();
    h.say(AZIZ, menu::SAVE_DATA).await;
    h.say(AZIZ, "Aziz").await;

    for phone in ["901234567", "+99890123456", "+998 90 123 45 67", "+79011234567"] {
        let out = h.say(AZIZ, phone).await;
        assert_eq!(out[0].text, texts::BAD_PHONE);
        assert_eq!(h.session_state(AZIZ), "awaiting_phone");
    }
    assert!(h.store.find_customer(AZIZ).await.unwrap().is_none());
}

#[tokio::test]
async fn test_blank_name_and_text_location_reprompt() {
    let h = Harness::new();
    h.say(AZIZ, menu::SAVE_DATA).await;

    assert_eq!(h.say(AZIZ, "   ").await[0].text, texts::NAME_EMPTY);
    assert_eq!(h.session_state(AZIZ), "awaiting_name");

    h.say(AZIZ, "Aziz").await;
    h.say(AZIZ, "+998901234567").await;
    let out = h.say(AZIZ, "Chilonzor 5").await;
    assert_eq!(out[0].text, texts::SEND_LOCATION_AGAIN);
    assert_eq!(h.session_state(AZIZ), "awaiting_location");

    h.locate(AZIZ, 41.3, 69.2).await;
    assert_eq!(h.say(AZIZ, "Contractor").await[0].text, texts::BAD_ROLE);
    assert_eq!(h.session_state(AZIZ), "awaiting_role");
}

#[tokio::test]
async fn test_non_contractor_has_no_bonus_menu() {
    let h = Harness::new();
    h.register(AZIZ, "Aziz", "Uy egasi").await;

    let out = h.say(AZIZ, menu::TOTAL_BONUS).await;
    assert_eq!(out[0].text, texts::CHOOSE_FROM_MENU);
}

#[tokio::test]
async fn test_order_confirmed_credits_bonus_once() {
    let h = Harness::new();
    h.seed_catalog().await;
    h.register(AZIZ, "Aziz", "Usta").await;

    // 1. Cart: 2 × Cement
    let out = h.say(AZIZ, menu::ORDER_PRODUCT).await;
    assert_eq!(out[0].text, texts::CHOOSE_GROUP);
    assert_eq!(out[0].tokens(), vec!["g:Qurilish"]);

    let out = h.press(AZIZ, "g:Qurilish").await;
    assert_eq!(out[0].tokens(), vec!["p:Cement", "cart"]);

    let out = h.press(AZIZ, "p:Cement").await;
    assert_eq!(out[0].text, "Cement uchun miqdorni kiriting:");

    let out = h.say(AZIZ, "2").await;
    assert!(out[0].text.starts_with("Cement (2 dona) savatga qo'shildi."));

    let out = h.press(AZIZ, "cart").await;
    assert_eq!(out[0].text, texts::SEND_ORDER_LOCATION);

    // 2. Location stages the order and notifies the admin
    let out = h.locate(AZIZ, 41.3, 69.2).await;
    let notice = message_to(&out, ADMIN);
    assert!(notice.text.contains("Umumiy summa: 100 000 so'm"));
    assert!(notice.text.contains("Ushbu buyurtma uchun yig'ilgan bonus: 10 000 so'm"));
    assert!(notice.text.contains("https://maps.google.com/?q=41.3,69.2"));
    assert_eq!(notice.tokens(), vec!["oc:42", "or:42"]);
    assert_eq!(message_to(&out, AZIZ).text, texts::ORDER_SENT);

    let staged = h.sessions.get(AZIZ).unwrap().staged_order.unwrap();
    assert_eq!(staged.order.total_sum, Decimal::new(100000, 0));
    assert_eq!(staged.order.bonus_sum, Decimal::new(10000, 0));
    assert!(h.store.list_orders(None).await.unwrap().is_empty());

    // 3. Admin confirms
    let out = h.press(ADMIN, "oc:42").await;
    assert_eq!(message_to(&out, ADMIN).text, texts::ADMIN_ORDER_CONFIRMED);
    let receipt = message_to(&out, AZIZ);
    assert!(receipt.text.contains("Ushbu buyurtma uchun yig'ilgan bonus: 10 000 so'm"));
    assert!(receipt.text.contains("Umumiy bonus: 10 000 so'm"));

    let customer = h.store.find_customer(AZIZ).await.unwrap().unwrap();
    assert_eq!(customer.bonus, Decimal::new(10000, 0));
    let orders = h.store.list_orders(Some(AZIZ)).await.unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].order.status, OrderStatus::Confirmed);

    // 4. Second confirmation finds nothing
    let out = h.press(ADMIN, "oc:42").await;
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].text, texts::ORDER_NOT_FOUND);
    let customer = h.store.find_customer(AZIZ).await.unwrap().unwrap();
    assert_eq!(customer.bonus, Decimal::new(10000, 0));
    assert_eq!(h.store.list_orders(None).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_order_rejected_writes_audit_row_only() {
    let h = Harness::new();
    h.seed_catalog().await;
    h.register(AZIZ, "Aziz", "Usta").await;
    h.fill_cart(AZIZ, "2").await;
    h.locate(AZIZ, 41.3, 69.2).await;

    let out = h.press(ADMIN, "or:42").await;

    assert_eq!(message_to(&out, AZIZ).text, texts::ORDER_REJECTED);
    assert_eq!(message_to(&out, ADMIN).text, texts::ADMIN_ORDER_REJECTED);
    assert!(h.sessions.get(AZIZ).is_none());

    let orders = h.store.list_orders(None).await.unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].order.status, OrderStatus::Rejected);
    let customer = h.store.find_customer(AZIZ).await.unwrap().unwrap();
    assert_eq!(customer.bonus, Decimal::ZERO);
}

#[tokio::test]
async fn test_invalid_quantity_keeps_cart_and_step() {
    let h = Harness::new();
    h.seed_catalog().await;
    h.register(AZIZ, "Aziz", "Usta").await;
    h.say(AZIZ, menu::ORDER_PRODUCT).await;
    h.press(AZIZ, "g:Qurilish").await;
    h.press(AZIZ, "p:Cement").await;

    for (input, reply) in [
        ("-3", texts::QUANTITY_NOT_POSITIVE),
        ("0", texts::QUANTITY_NOT_POSITIVE),
        ("abc", texts::QUANTITY_NOT_INTEGER),
        ("2.5", texts::QUANTITY_NOT_INTEGER),
    ] {
        let out = h.say(AZIZ, input).await;
        assert_eq!(out[0].text, reply, "input {input}");
        assert_eq!(h.session_state(AZIZ), "awaiting_quantity");
        let cart = h.sessions.get(AZIZ).unwrap().cart.unwrap();
        assert!(cart.is_empty());
    }
}

#[tokio::test]
async fn test_confirming_empty_cart_is_refused() {
    let h = Harness::new();
    h.seed_catalog().await;
    h.register(AZIZ, "Aziz", "Usta").await;
    h.say(AZIZ, menu::ORDER_PRODUCT).await;
    h.press(AZIZ, "g:Qurilish").await;

    let out = h.press(AZIZ, "cart").await;

    assert_eq!(out[0].text, texts::CART_EMPTY);
    assert_eq!(h.session_state(AZIZ), "awaiting_product_selection");
}

#[tokio::test]
async fn test_ordering_without_groups() {
    let h = Harness::new();
    h.register(AZIZ, "Aziz", "Usta").await;

    let out = h.say(AZIZ, menu::ORDER_PRODUCT).await;

    assert_eq!(out[0].text, texts::NO_GROUPS);
    assert_eq!(h.session_state(AZIZ), "idle");
}

#[tokio::test]
async fn test_menu_press_abandons_flow() {
    let h = Harness::new();
    h.seed_catalog().await;
    h.register(AZIZ, "Aziz", "Usta").await;
    h.say(AZIZ, menu::ORDER_PRODUCT).await;
    h.press(AZIZ, "g:Qurilish").await;
    h.press(AZIZ, "p:Cement").await;

    let out = h.say(AZIZ, menu::MY_ORDERS).await;

    assert_eq!(out[0].text, texts::NO_ORDERS);
    assert!(h.sessions.get(AZIZ).is_none());
}

#[tokio::test]
async fn test_stale_product_button_asks_to_restart() {
    let h = Harness::new();
    h.seed_catalog().await;
    h.register(AZIZ, "Aziz", "Usta").await;

    let out = h.press(AZIZ, "p:Cement").await;

    assert_eq!(out.len(), 1);
    assert_eq!(out[0].text, texts::RESTART);
    assert_eq!(h.session_state(AZIZ), "idle");
}

#[tokio::test]
async fn test_product_removed_before_quantity() {
    let h = Harness::new();
    h.seed_catalog().await;
    h.register(AZIZ, "Aziz", "Usta").await;
    h.say(AZIZ, menu::ORDER_PRODUCT).await;
    h.press(AZIZ, "g:Qurilish").await;
    h.press(AZIZ, "p:Cement").await;

    h.store.delete_product("Qurilish", "Cement").await.unwrap();
    let out = h.say(AZIZ, "2").await;

    assert_eq!(out[0].text, texts::PRODUCT_NOT_FOUND);
    assert_eq!(out[0].tokens(), vec!["cart"]);
    assert_eq!(h.session_state(AZIZ), "awaiting_product_selection");
}

#[tokio::test]
async fn test_store_outage_keeps_session_for_retry() {
    let h = Harness::new();
    h.seed_catalog().await;
    h.register(AZIZ, "Aziz", "Usta").await;
    h.fill_cart(AZIZ, "2").await;
    let before = h.sessions.get(AZIZ).unwrap();

    // 1. Outage while placing the order
    h.store.inner().set_unavailable(true);
    let out = h.locate(AZIZ, 41.3, 69.2).await;
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].text, texts::NETWORK_ERROR);
    assert_eq!(h.sessions.get(AZIZ).unwrap(), before);

    // 2. Retry after recovery
    h.store.inner().set_unavailable(false);
    let out = h.locate(AZIZ, 41.3, 69.2).await;
    assert_eq!(message_to(&out, AZIZ).text, texts::ORDER_SENT);
}

#[tokio::test]
async fn test_second_order_replaces_undecided_stage() {
    let h = Harness::new();
    h.seed_catalog().await;
    h.register(AZIZ, "Aziz", "Usta").await;
    h.fill_cart(AZIZ, "1").await;
    h.locate(AZIZ, 41.3, 69.2).await;
    h.fill_cart(AZIZ, "3").await;
    h.locate(AZIZ, 41.3, 69.2).await;

    let staged = h.sessions.get(AZIZ).unwrap().staged_order.unwrap();
    assert_eq!(staged.order.total_sum, Decimal::new(150000, 0));
}

#[tokio::test]
async fn test_my_orders_lists_pending_stage() {
    let h = Harness::new();
    h.seed_catalog().await;
    h.register(AZIZ, "Aziz", "Uy egasi").await;
    h.fill_cart(AZIZ, "1").await;
    h.locate(AZIZ, 41.3, 69.2).await;

    let out = h.say(AZIZ, menu::MY_ORDERS).await;

    assert_eq!(out.len(), 1);
    assert!(out[0].text.contains("Holat: Kutilmoqda"));
    assert!(out[0].text.contains("Umumiy summa: 50 000 so'm"));
}

#[tokio::test]
async fn test_oversized_price_is_refused_in_chat() {
    let h = Harness::new();
    h.store.add_group("Qurilish").await.unwrap();

    h.say(ADMIN, menu::ADD_PRODUCT).await;
    h.press(ADMIN, "ag:Qurilish").await;
    h.say(ADMIN, "Big").await;

    let out = h.say(ADMIN, "79228162514264337593543950335").await;
    assert_eq!(out[0].text, texts::PRICE_TOO_LARGE);
    assert_eq!(h.session_state(ADMIN), "awaiting_product_price");
    assert!(h.store.list_products(Some("Qurilish")).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_overflowing_cart_line_is_refused() {
    let h = Harness::new();
    h.register(AZIZ, "Aziz", "Usta").await;

    // 1. A price typed straight into the sheet, past any chat limit
    h.store.add_group("Qurilish").await.unwrap();
    h.store
        .upsert_product(&Product {
            group: "Qurilish".to_string(),
            name: "Big".to_string(),
            price: Decimal::MAX,
            bonus_percent: Decimal::new(10, 0),
            quantity: 1,
        })
        .await
        .unwrap();

    // 2. The line is refused, the quantity is asked again
    h.say(AZIZ, menu::ORDER_PRODUCT).await;
    h.press(AZIZ, "g:Qurilish").await;
    h.press(AZIZ, "p:Big").await;
    let out = h.say(AZIZ, "2").await;
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].text, texts::CART_TOO_LARGE);
    assert_eq!(h.session_state(AZIZ), "awaiting_quantity");

    // 3. Nothing reached the cart
    let cart = h.sessions.load(AZIZ).cart.unwrap();
    assert!(cart.is_empty());
    assert_eq!(cart.total_sum(), Decimal::ZERO);

    // 4. The bot keeps answering
    assert_eq!(h.say(AZIZ, "-3").await[0].text, texts::QUANTITY_NOT_POSITIVE);
}
