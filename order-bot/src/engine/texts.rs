//! User-facing texts (Uzbek)

use rust_decimal::Decimal;
use shared::UserId;
use shared::models::{Customer, Order, OrderStatus, Product, Profile, Role};
use shared::util::{format_currency, format_decimal};

// ── Common ──────────────────────────────────────────────────────────

pub const NETWORK_ERROR: &str = "Tarmoq xatosi yuz berdi, iltimos, keyinroq urinib ko'ring.";
pub const GENERIC_ERROR: &str = "Xato yuz berdi, admin bilan bog'laning.";
pub const RESTART: &str = "Xato: Holat topilmadi. Iltimos, /start orqali qaytadan boshlang.";
pub const CHOOSE_FROM_MENU: &str = "Iltimos, menyudan biror amalni tanlang.";
pub const CHOOSE_FROM_LIST: &str = "Iltimos, ro'yxatdan tanlang.";
pub const NO_GROUPS: &str = "Hozirda guruhlar mavjud emas.";
pub const LOCATION_BUTTON: &str = "Lokatsiyani yuborish";

pub fn your_id(user_id: UserId) -> String {
    format!("Sizning ID: {user_id}")
}

// ── Customer: registration and profile ─────────────────────────────

pub const PLEASE_REGISTER: &str = "Iltimos, ma'lumotlaringizni saqlang.";
pub const ENTER_NAME: &str = "Ismingizni kiriting:";
pub const NAME_EMPTY: &str = "Iltimos, ismingizni kiriting (bo'sh bo'lmasligi kerak):";
pub const NAME_TOO_LONG: &str = "Ism juda uzun (ko'pi bilan 100 belgi). Qaytadan kiriting:";
pub const ENTER_PHONE: &str = "Telefon raqamingizni kiriting (+998XXXXXXXXX):";
pub const BAD_PHONE: &str = "Iltimos, to'g'ri telefon raqamini kiriting (+998XXXXXXXXX):";
pub const SEND_LOCATION: &str = "Lokatsiyangizni yuboring:";
pub const SEND_LOCATION_AGAIN: &str = "Iltimos, lokatsiyani tugma orqali yuboring:";
pub const CHOOSE_ROLE: &str = "Faoliyat turini tanlang:";
pub const BAD_ROLE: &str = "Iltimos, quyidagi variantlardan birini tanlang: Do'kon egasi, Qurilish kompaniyasi, Uy egasi, Usta";
pub const REGISTERED: &str = "Ma'lumotlaringiz saqlandi!";
pub const EDIT_SENT: &str =
    "Ma'lumotlarni o'zgartirish so'rovi adminga yuborildi. Tasdiqlanishini kuting.";
pub const EDIT_APPROVED: &str = "Ma'lumotlaringiz yangilandi!";
pub const EDIT_REJECTED: &str = "Ma'lumotlarni o'zgartirish so'rovingiz rad etildi. Qo'shimcha ma'lumot uchun admin bilan bog'laning.";

pub fn welcome(name: &str) -> String {
    format!("Xush kelibsiz, {name}!")
}

pub fn enter_new_name(current: &str) -> String {
    format!("Joriy ism: {current}\nYangi ismingizni kiriting:")
}

pub fn contact_admin(admin_id: UserId) -> String {
    format!("Admin bilan bog'lanish uchun: tg://user?id={admin_id}")
}

// ── Customer: ordering ──────────────────────────────────────────────

pub const CHOOSE_GROUP: &str = "Mahsulot buyurtma qilish uchun guruhni tanlang:";
pub const CONFIRM_CART_BUTTON: &str = "Savatni tasdiqlash";
pub const QUANTITY_NOT_POSITIVE: &str = "Iltimos, 0 dan katta miqdor kiriting.";
pub const QUANTITY_NOT_INTEGER: &str = "Iltimos, to'g'ri miqdor kiriting (butun son).";
pub const QUANTITY_TOO_LARGE: &str = "Miqdor juda katta. Iltimos, kamroq miqdor kiriting.";
pub const CART_TOO_LARGE: &str = "Buyurtma summasi juda katta. Iltimos, kamroq miqdor kiriting.";
pub const PRODUCT_NOT_FOUND: &str = "Mahsulot topilmadi. Iltimos, qaytadan urinib ko'ring.";
pub const CART_EMPTY: &str = "Savat bo'sh! Iltimos, avval mahsulot qo'shing.";
pub const SEND_ORDER_LOCATION: &str = "Buyurtma yetkazib beriladigan lokatsiyani yuboring:";
pub const SEND_ORDER_LOCATION_AGAIN: &str =
    "Iltimos, buyurtma yetkazib beriladigan lokatsiyani yuboring:";
pub const ORDER_SENT: &str = "Buyurtmangiz adminga yuborildi. Tasdiqlanishini kuting.";
pub const NO_ORDERS: &str = "Sizda buyurtmalar yo'q.";
pub const ORDER_REJECTED: &str = "Sizning buyurtmangiz rad etildi. Qo'shimcha ma'lumot uchun admin bilan bog'laning.";

pub fn group_products(group: &str) -> String {
    format!("{group} guruhidagi mahsulotlar:")
}

pub fn group_empty(group: &str) -> String {
    format!("{group} guruhida mahsulotlar yo'q.")
}

pub fn enter_quantity(product: &str) -> String {
    format!("{product} uchun miqdorni kiriting:")
}

pub fn added_to_cart(product: &str, quantity: u32) -> String {
    format!(
        "{product} ({quantity} dona) savatga qo'shildi. Yana mahsulot qo'shasizmi yoki savatni tasdiqlaysizmi?"
    )
}

/// Button label of a product in the customer's list
pub fn product_button(product: &Product) -> String {
    format!("{} ({})", product.name, format_currency(product.price))
}

pub fn status_label(status: OrderStatus) -> &'static str {
    match status {
        OrderStatus::Pending => "Kutilmoqda",
        OrderStatus::Confirmed => "Tasdiqlangan",
        OrderStatus::Rejected => "Rad etilgan",
    }
}

/// Entry of the customer's own order history
pub fn order_history_entry(order: &Order) -> String {
    format!(
        "Sana: {}\nGuruh: {}\nMahsulotlar:\n{}\nUmumiy summa: {}\nHolat: {}",
        order.created_at.format(shared::models::ORDER_TIME_FORMAT),
        order.group,
        order.items_text,
        format_currency(order.total_sum),
        status_label(order.status)
    )
}

pub fn order_confirmed(order: &Order, role: Role, balance: Decimal) -> String {
    let mut text = format!(
        "Sizning buyurtmangiz tasdiqlandi, hamkorligingizdan hursandmiz!\nGuruh: {}\nMahsulotlar:\n{}\nUmumiy summa: {}",
        order.group,
        order.items_text,
        format_currency(order.total_sum)
    );
    if role.earns_bonus() {
        text.push_str(&format!(
            "\nUshbu buyurtma uchun yig'ilgan bonus: {}\nUmumiy bonus: {}",
            format_currency(order.bonus_sum),
            format_currency(balance)
        ));
    }
    text
}

// ── Customer: bonus ─────────────────────────────────────────────────

pub const NO_BONUS: &str = "Sizda yechish uchun bonus mavjud emas.";
pub const BONUS_REQUEST_SENT: &str = "Bonusni yechish so'rovi adminga yuborildi.";
pub const BONUS_REJECTED: &str = "Sizning bonus yechish so'rovingiz rad etildi. Qo'shimcha ma'lumot uchun admin bilan bog'laning.";

pub fn total_bonus(balance: Decimal) -> String {
    format!("Sizning umumiy bonusingiz: {}", format_currency(balance))
}

pub fn bonus_approved(withdrawn: Decimal) -> String {
    format!(
        "Sizning bonus yechish so'rovingiz tasdiqlandi. Yechilgan summa: {}. \
         Bonus summangiz 0 ga tenglashtirildi.",
        format_currency(withdrawn)
    )
}

// ── Admin notifications ─────────────────────────────────────────────

pub const APPROVE_BUTTON: &str = "Tasdiqlash";
pub const REJECT_BUTTON: &str = "Rad etish";

/// `https://maps.google.com/?q=lat,lon` for addresses recorded from a location
pub fn maps_link(address: &str) -> Option<String> {
    let rest = address.trim().strip_prefix("Lat:")?;
    let (lat, lon) = rest.split_once("Lon:")?;
    let lat: f64 = lat.trim().trim_end_matches(',').trim().parse().ok()?;
    let lon: f64 = lon.trim().parse().ok()?;
    Some(format!("https://maps.google.com/?q={lat},{lon}"))
}

/// `Lat:41.3 Lon:69.2`
pub fn location_address(lat: f64, lon: f64) -> String {
    format!("Lat:{lat} Lon:{lon}")
}

fn address_lines(address: &str) -> String {
    match maps_link(address) {
        Some(link) => format!("Manzil: {address}\nXarita: {link}"),
        None => format!("Manzil: {address}"),
    }
}

pub fn new_order(order: &Order, role: Role) -> String {
    let mut text = format!(
        "Yangi buyurtma:\nHaridor ID: {}\nHaridor: {}\nTelefon: {}\n{}\nGuruh: {}\nMahsulotlar:\n{}\nUmumiy summa: {}",
        order.customer_id,
        order.customer_name,
        order.phone,
        address_lines(&order.address),
        order.group,
        order.items_text,
        format_currency(order.total_sum)
    );
    if role.earns_bonus() {
        text.push_str(&format!(
            "\nUshbu buyurtma uchun yig'ilgan bonus: {}",
            format_currency(order.bonus_sum)
        ));
    }
    text
}

pub fn bonus_request(customer: &Customer, amount: Decimal) -> String {
    format!(
        "Foydalanuvchi {} ({}) {} bonusni yechmoqchi. Tasdiqlaysizmi?",
        customer.id,
        customer.name,
        format_currency(amount)
    )
}

pub fn edit_request(customer: &Customer, proposed: &Profile) -> String {
    format!(
        "Foydalanuvchi {} ({}) shaxsiy ma'lumotlarini o'zgartirmoqchi:\n\
         Ism: {} → {}\nTelefon: {} → {}\nManzil: {} → {}\nFaoliyat turi: {} → {}\nTasdiqlaysizmi?",
        customer.id,
        customer.name,
        customer.name,
        proposed.name,
        customer.phone,
        proposed.phone,
        customer.address,
        proposed.address,
        customer.role,
        proposed.role
    )
}

// ── Admin decisions ─────────────────────────────────────────────────

pub const ORDER_NOT_FOUND: &str = "Xato: Buyurtma topilmadi!";
pub const CUSTOMER_NOT_FOUND: &str = "Xato: Foydalanuvchi topilmadi!";
pub const REQUEST_NOT_FOUND: &str = "Xato: So'rov topilmadi!";
pub const ADMIN_ORDER_CONFIRMED: &str = "Buyurtma tasdiqlandi.";
pub const ADMIN_ORDER_REJECTED: &str = "Buyurtma rad etildi.";
pub const ADMIN_BONUS_APPROVED: &str = "Bonus yechish tasdiqlandi.";
pub const ADMIN_BONUS_REJECTED: &str = "Bonus yechish rad etildi.";
pub const ADMIN_EDIT_APPROVED: &str = "Ma'lumotlarni o'zgartirish tasdiqlandi.";
pub const ADMIN_EDIT_REJECTED: &str = "Ma'lumotlarni o'zgartirish rad etildi.";

pub fn already_processed(status: OrderStatus) -> String {
    format!(
        "Bu buyurtma allaqachon ko'rib chiqilgan ({}).",
        status_label(status)
    )
}

// ── Admin catalog ───────────────────────────────────────────────────

pub const ADMIN_WELCOME: &str = "Xush kelibsiz, Admin! Quyidagi amallarni bajarishingiz mumkin:";
pub const ENTER_GROUP_NAME: &str = "Yangi guruh nomini kiriting:";
pub const GROUP_EXISTS: &str = "Bu guruh allaqachon mavjud. Boshqa nom kiriting:";
pub const BAD_CATALOG_NAME: &str =
    "Nom bo'sh bo'lmasligi va 40 baytdan oshmasligi kerak. Qaytadan kiriting:";
pub const GROUP_NOT_FOUND: &str = "Xato: Guruh topilmadi!";
pub const NO_GROUPS_ADD_FIRST: &str = "Hozirda guruhlar mavjud emas. Avval guruh qo'shing.";
pub const PICK_GROUP_FOR_ADD: &str = "Mahsulot qo'shish uchun guruhni tanlang:";
pub const PICK_GROUP_FOR_EDIT: &str = "Tahrirlamoqchi bo'lgan mahsulot guruhini tanlang:";
pub const PICK_GROUP_FOR_PRODUCT_DELETE: &str =
    "O'chirmoqchi bo'lgan mahsulot guruhini tanlang:";
pub const PICK_GROUP_TO_DELETE: &str =
    "O'chirmoqchi bo'lgan guruhni tanlang (guruhdagi mahsulotlar ham o'chiriladi):";
pub const PICK_GROUP_FOR_LIST: &str = "Mahsulotlar ro'yxatini ko'rish uchun guruhni tanlang:";
pub const PRODUCT_EXISTS: &str = "Bu guruhda bunday mahsulot mavjud. Boshqa nom kiriting:";
pub const ENTER_PRICE: &str = "Mahsulot narxini kiriting:";
pub const PRICE_NOT_POSITIVE: &str = "Iltimos, 0 dan katta narx kiriting.";
pub const PRICE_TOO_LARGE: &str = "Narx juda katta. Iltimos, haqiqiy narx kiriting.";
pub const PRICE_NOT_NUMBER: &str = "Iltimos, to'g'ri narx kiriting (masalan, 40000).";
pub const ENTER_BONUS_PERCENT: &str = "Usta uchun bonus foizini kiriting (%):";
pub const PERCENT_OUT_OF_RANGE: &str = "Iltimos, 0 dan 100 gacha foiz kiriting.";
pub const PERCENT_NOT_NUMBER: &str = "Iltimos, to'g'ri foiz kiriting (masalan, 12.5).";
pub const ENTER_STOCK: &str = "Mahsulot miqdorini kiriting (dona):";
pub const STOCK_NEGATIVE: &str = "Iltimos, 0 yoki undan katta miqdor kiriting.";
pub const PRODUCT_MISSING: &str = "Xato: Mahsulot topilmadi!";
pub const ENTER_DATE: &str = "Sanani kiriting (YYYY-MM-DD):";
pub const BAD_DATE: &str = "Iltimos, sanani YYYY-MM-DD formatida kiriting:";
pub const NO_ORDERS_ON_DATE: &str = "Bu sanada buyurtmalar yo'q.";
pub const NO_CUSTOMERS: &str = "Haridorlar yo'q.";

pub fn group_added(group: &str) -> String {
    format!("Guruh qo'shildi: {group}")
}

pub fn group_deleted(group: &str, products: usize) -> String {
    format!("Guruh o'chirildi: {group} ({products} ta mahsulot bilan)")
}

pub fn enter_product_name(group: &str) -> String {
    format!("{group} guruhiga yangi mahsulot nomini kiriting:")
}

pub fn pick_product(group: &str) -> String {
    format!("{group} guruhidagi mahsulotlarni tanlang:")
}

pub fn product_added(product: &Product) -> String {
    format!("Mahsulot qo'shildi: {} ({})", product.name, product.group)
}

pub fn product_updated(product: &Product) -> String {
    format!(
        "Mahsulot ma'lumotlari muvaffaqiyatli o'zgartirildi: {} ({})",
        product.name, product.group
    )
}

pub fn product_deleted(group: &str, name: &str) -> String {
    format!("Mahsulot o'chirildi: {name} ({group})")
}

pub fn product_line(product: &Product) -> String {
    format!(
        "{} - {}, bonus: {}%, miqdor: {} dona",
        product.name,
        format_currency(product.price),
        format_decimal(product.bonus_percent),
        product.quantity
    )
}

pub fn edit_product_start(product: &Product) -> String {
    format!(
        "Joriy mahsulot: {} ({})\nNarx: {}\nBonus foizi: {}%\nMiqdor: {} dona\n\
         Yangi nom kiriting (yoki o'zgartirmaslik uchun joriy nomni qaytaring):",
        product.name,
        product.group,
        format_currency(product.price),
        format_decimal(product.bonus_percent),
        product.quantity
    )
}

pub fn edit_product_price(name: &str, current: Decimal) -> String {
    format!(
        "Yangi nom saqlandi: {name}\nJoriy narx: {}\n\
         Yangi narx kiriting (yoki o'zgartirmaslik uchun joriy narxni qaytaring):",
        format_decimal(current)
    )
}

pub fn edit_product_bonus(price: Decimal, current: Decimal) -> String {
    format!(
        "Yangi narx saqlandi: {}\nJoriy bonus foizi: {}%\n\
         Yangi bonus foizini kiriting (yoki o'zgartirmaslik uchun joriy foizni qaytaring):",
        format_currency(price),
        format_decimal(current)
    )
}

pub fn edit_product_stock(percent: Decimal, current: u32) -> String {
    format!(
        "Yangi bonus foizi saqlandi: {}%\nJoriy miqdor: {current} dona\n\
         Yangi miqdorni kiriting (yoki o'zgartirmaslik uchun joriy miqdorni qaytaring):",
        format_decimal(percent)
    )
}

pub fn customer_line(customer: &Customer) -> String {
    format!(
        "ID: {}, Ism: {}, Telefon: {}, Faoliyat turi: {}, Bonus: {}",
        customer.id,
        customer.name,
        customer.phone,
        customer.role,
        format_currency(customer.bonus)
    )
}

/// Stored order as listed by date
pub fn stored_order(order: &Order) -> String {
    let mut text = format!(
        "Buyurtma:\nHaridor ID: {}\nHaridor: {}\nTelefon: {}\n{}\nGuruh: {}\nSana: {}\nMahsulotlar:\n{}\nUmumiy summa: {}",
        order.customer_id,
        order.customer_name,
        order.phone,
        address_lines(&order.address),
        order.group,
        order.created_at.format(shared::models::ORDER_TIME_FORMAT),
        order.items_text,
        format_currency(order.total_sum)
    );
    if order.bonus_sum > Decimal::ZERO {
        text.push_str(&format!(
            "\nBonus summasi: {}",
            format_currency(order.bonus_sum)
        ));
    }
    text.push_str(&format!("\nHolat: {}", status_label(order.status)));
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_maps_link_from_recorded_location() {
        assert_eq!(
            maps_link(&location_address(41.3, 69.2)).as_deref(),
            Some("https://maps.google.com/?q=41.3,69.2")
        );
        assert_eq!(
            maps_link("Lat: 41.3, Lon: 69.2").as_deref(),
            Some("https://maps.google.com/?q=41.3,69.2")
        );
        assert_eq!(maps_link("Toshkent, Chilonzor"), None);
    }

    #[test]
    fn test_total_bonus_formats_currency() {
        assert_eq!(total_bonus(Decimal::ZERO), "Sizning umumiy bonusingiz: 0 so'm");
    }

    #[test]
    fn test_edit_price_prompt_shows_current_value_plainly() {
        let text = edit_product_price("Cement", Decimal::new(50000, 0));
        assert!(text.contains("Joriy narx: 50000"));
    }
}
