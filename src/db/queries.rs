use anyhow::anyhow;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

use crate::models::{
    AddOn, Address, AddressForm, Booking, BookingStatus, PaymentMethod, PaymentStatus, Role,
    Service, ServiceCategory, TimeSlot, User,
};
use crate::services::identity::Identity;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const DATE_FORMAT: &str = "%Y-%m-%d";

fn now_string() -> String {
    Utc::now().naive_utc().format(TIMESTAMP_FORMAT).to_string()
}

fn parse_timestamp(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT).unwrap_or_else(|_| Utc::now().naive_utc())
}

// ── Users ──

const USER_COLUMNS: &str = "id, phone, email, name, role, is_verified, created_at";

fn parse_user_row(row: &Row) -> rusqlite::Result<User> {
    let role: String = row.get(4)?;
    let created_at: String = row.get(6)?;
    Ok(User {
        id: row.get(0)?,
        phone: row.get(1)?,
        email: row.get(2)?,
        name: row.get(3)?,
        role: Role::parse(&role).unwrap_or(Role::Customer),
        is_verified: row.get(5)?,
        created_at: parse_timestamp(&created_at),
    })
}

fn query_user(conn: &Connection, sql: &str, param: &str) -> anyhow::Result<Option<User>> {
    match conn.query_row(sql, params![param], parse_user_row) {
        Ok(user) => Ok(Some(user)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn get_user(conn: &Connection, id: &str) -> anyhow::Result<Option<User>> {
    query_user(
        conn,
        &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
        id,
    )
}

pub fn find_user_by_identity(conn: &Connection, identity: &Identity) -> anyhow::Result<Option<User>> {
    let column = match identity {
        Identity::Phone(_) => "phone",
        Identity::Email(_) => "email",
    };
    query_user(
        conn,
        &format!("SELECT {USER_COLUMNS} FROM users WHERE {column} = ?1"),
        identity.as_str(),
    )
}

/// The seeded account used by the demo role picker.
pub fn find_demo_user(conn: &Connection, role: Role) -> anyhow::Result<Option<User>> {
    query_user(
        conn,
        &format!("SELECT {USER_COLUMNS} FROM users WHERE role = ?1 ORDER BY created_at ASC LIMIT 1"),
        role.as_str(),
    )
}

pub fn create_user(conn: &Connection, identity: &Identity, role: Role) -> anyhow::Result<User> {
    let (phone, email) = match identity {
        Identity::Phone(p) => (Some(p.clone()), None),
        Identity::Email(e) => (None, Some(e.clone())),
    };
    let user = User {
        id: Uuid::new_v4().to_string(),
        phone,
        email,
        name: String::new(),
        role,
        is_verified: true,
        created_at: Utc::now().naive_utc(),
    };

    conn.execute(
        "INSERT INTO users (id, phone, email, name, role, is_verified, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            user.id,
            user.phone,
            user.email,
            user.name,
            user.role.as_str(),
            user.is_verified,
            user.created_at.format(TIMESTAMP_FORMAT).to_string(),
        ],
    )?;
    Ok(user)
}

/// Phone numbers are fixed at sign-up; only name and email change.
pub fn update_profile(
    conn: &Connection,
    id: &str,
    name: &str,
    email: Option<&str>,
) -> anyhow::Result<Option<User>> {
    let count = conn.execute(
        "UPDATE users SET name = ?1, email = ?2 WHERE id = ?3",
        params![name, email, id],
    )?;
    if count == 0 {
        return Ok(None);
    }
    get_user(conn, id)
}

pub fn count_users(conn: &Connection) -> anyhow::Result<i64> {
    Ok(conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?)
}

// ── Catalog ──

pub fn list_categories(conn: &Connection) -> anyhow::Result<Vec<ServiceCategory>> {
    let mut stmt = conn.prepare(
        "SELECT c.id, c.name, c.icon, c.description, COUNT(s.id)
         FROM categories c LEFT JOIN services s ON s.category_id = c.id
         GROUP BY c.id ORDER BY c.position ASC",
    )?;

    let rows = stmt.query_map([], |row| {
        Ok(ServiceCategory {
            id: row.get(0)?,
            name: row.get(1)?,
            icon: row.get(2)?,
            description: row.get(3)?,
            services_count: row.get(4)?,
        })
    })?;

    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

const SERVICE_COLUMNS: &str =
    "id, category_id, name, description, price, duration_minutes, inclusions, rating, reviews_count";

fn parse_service_row(row: &Row) -> rusqlite::Result<Service> {
    let inclusions: String = row.get(6)?;
    Ok(Service {
        id: row.get(0)?,
        category_id: row.get(1)?,
        name: row.get(2)?,
        description: row.get(3)?,
        price: row.get(4)?,
        duration_minutes: row.get(5)?,
        inclusions: serde_json::from_str(&inclusions).unwrap_or_default(),
        rating: row.get(7)?,
        reviews_count: row.get(8)?,
    })
}

pub fn list_services(conn: &Connection, category_id: Option<&str>) -> anyhow::Result<Vec<Service>> {
    let services = match category_id {
        Some(category) => {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SERVICE_COLUMNS} FROM services WHERE category_id = ?1 ORDER BY id ASC"
            ))?;
            let rows = stmt.query_map(params![category], parse_service_row)?;
            rows.collect::<Result<Vec<_>, _>>()?
        }
        None => {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SERVICE_COLUMNS} FROM services ORDER BY category_id ASC, id ASC"
            ))?;
            let rows = stmt.query_map([], parse_service_row)?;
            rows.collect::<Result<Vec<_>, _>>()?
        }
    };
    Ok(services)
}

pub fn get_service(conn: &Connection, id: &str) -> anyhow::Result<Option<Service>> {
    match conn.query_row(
        &format!("SELECT {SERVICE_COLUMNS} FROM services WHERE id = ?1"),
        params![id],
        parse_service_row,
    ) {
        Ok(service) => Ok(Some(service)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn category_exists(conn: &Connection, id: &str) -> anyhow::Result<bool> {
    Ok(conn.query_row(
        "SELECT COUNT(*) > 0 FROM categories WHERE id = ?1",
        params![id],
        |row| row.get(0),
    )?)
}

fn parse_add_on_row(row: &Row) -> rusqlite::Result<AddOn> {
    Ok(AddOn {
        id: row.get(0)?,
        service_id: row.get(1)?,
        name: row.get(2)?,
        price: row.get(3)?,
        duration_minutes: row.get(4)?,
    })
}

pub fn list_add_ons(conn: &Connection, service_id: &str) -> anyhow::Result<Vec<AddOn>> {
    let mut stmt = conn.prepare(
        "SELECT id, service_id, name, price, duration_minutes
         FROM add_ons WHERE service_id = ?1 ORDER BY id ASC",
    )?;
    let rows = stmt.query_map(params![service_id], parse_add_on_row)?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

pub fn get_add_on(conn: &Connection, id: &str) -> anyhow::Result<Option<AddOn>> {
    match conn.query_row(
        "SELECT id, service_id, name, price, duration_minutes FROM add_ons WHERE id = ?1",
        params![id],
        parse_add_on_row,
    ) {
        Ok(add_on) => Ok(Some(add_on)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Slots offered on `date`. A slot that has already started today is not
/// bookable even if the template marks it available.
pub fn list_time_slots(
    conn: &Connection,
    date: NaiveDate,
    now: NaiveDateTime,
) -> anyhow::Result<Vec<TimeSlot>> {
    let mut stmt =
        conn.prepare("SELECT id, label, starts_at, available FROM time_slots ORDER BY starts_at ASC")?;

    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, bool>(3)?,
        ))
    })?;

    let mut slots = vec![];
    for row in rows {
        let (id, time, starts_at, available) = row?;
        let starts_at = NaiveTime::parse_from_str(&starts_at, "%H:%M")
            .map_err(|e| anyhow!("invalid slot time {starts_at}: {e}"))?;
        let elapsed = date < now.date() || (date == now.date() && starts_at <= now.time());
        slots.push(TimeSlot {
            id,
            time,
            starts_at,
            available: available && !elapsed,
        });
    }
    Ok(slots)
}

// ── Addresses ──

fn parse_address_row(row: &Row) -> rusqlite::Result<Address> {
    Ok(Address {
        id: row.get(0)?,
        user_id: row.get(1)?,
        label: row.get(2)?,
        full_address: row.get(3)?,
        city: row.get(4)?,
        pincode: row.get(5)?,
        landmark: row.get(6)?,
        is_default: row.get(7)?,
    })
}

const ADDRESS_COLUMNS: &str = "id, user_id, label, full_address, city, pincode, landmark, is_default";

pub fn list_addresses(conn: &Connection, user_id: &str) -> anyhow::Result<Vec<Address>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {ADDRESS_COLUMNS} FROM addresses WHERE user_id = ?1
         ORDER BY is_default DESC, created_at ASC, id ASC"
    ))?;
    let rows = stmt.query_map(params![user_id], parse_address_row)?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

pub fn get_address(conn: &Connection, user_id: &str, id: &str) -> anyhow::Result<Option<Address>> {
    match conn.query_row(
        &format!("SELECT {ADDRESS_COLUMNS} FROM addresses WHERE id = ?1 AND user_id = ?2"),
        params![id, user_id],
        parse_address_row,
    ) {
        Ok(address) => Ok(Some(address)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// The first address a user saves becomes their default.
pub fn create_address(conn: &Connection, user_id: &str, form: &AddressForm) -> anyhow::Result<Address> {
    let existing: i64 = conn.query_row(
        "SELECT COUNT(*) FROM addresses WHERE user_id = ?1",
        params![user_id],
        |row| row.get(0),
    )?;

    let address = Address {
        id: Uuid::new_v4().to_string(),
        user_id: user_id.to_string(),
        label: form.label.trim().to_string(),
        full_address: form.full_address.trim().to_string(),
        city: form.city.trim().to_string(),
        pincode: form.pincode.trim().to_string(),
        landmark: form.landmark(),
        is_default: existing == 0,
    };

    conn.execute(
        "INSERT INTO addresses (id, user_id, label, full_address, city, pincode, landmark, is_default, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            address.id,
            address.user_id,
            address.label,
            address.full_address,
            address.city,
            address.pincode,
            address.landmark,
            address.is_default,
            now_string(),
        ],
    )?;
    Ok(address)
}

pub fn update_address(
    conn: &Connection,
    user_id: &str,
    id: &str,
    form: &AddressForm,
) -> anyhow::Result<Option<Address>> {
    let count = conn.execute(
        "UPDATE addresses SET label = ?1, full_address = ?2, city = ?3, pincode = ?4, landmark = ?5
         WHERE id = ?6 AND user_id = ?7",
        params![
            form.label.trim(),
            form.full_address.trim(),
            form.city.trim(),
            form.pincode.trim(),
            form.landmark(),
            id,
            user_id,
        ],
    )?;
    if count == 0 {
        return Ok(None);
    }
    get_address(conn, user_id, id)
}

/// Removing the default address promotes the oldest remaining one.
pub fn delete_address(conn: &Connection, user_id: &str, id: &str) -> anyhow::Result<bool> {
    let Some(address) = get_address(conn, user_id, id)? else {
        return Ok(false);
    };

    conn.execute(
        "DELETE FROM addresses WHERE id = ?1 AND user_id = ?2",
        params![id, user_id],
    )?;

    if address.is_default {
        conn.execute(
            "UPDATE addresses SET is_default = 1 WHERE id = (
                SELECT id FROM addresses WHERE user_id = ?1 ORDER BY created_at ASC, id ASC LIMIT 1
             )",
            params![user_id],
        )?;
    }
    Ok(true)
}

pub fn set_default_address(conn: &Connection, user_id: &str, id: &str) -> anyhow::Result<bool> {
    if get_address(conn, user_id, id)?.is_none() {
        return Ok(false);
    }
    conn.execute(
        "UPDATE addresses SET is_default = (id = ?1) WHERE user_id = ?2",
        params![id, user_id],
    )?;
    Ok(true)
}

// ── Bookings ──

const BOOKING_COLUMNS: &str = "id, customer_id, partner_id, service, add_ons, address, scheduled_date, \
     scheduled_time, status, subtotal, tax, total_amount, payment_method, payment_status, rating, review, \
     created_at, updated_at";

pub fn create_booking(conn: &Connection, booking: &Booking) -> anyhow::Result<()> {
    conn.execute(
        &format!(
            "INSERT INTO bookings ({BOOKING_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)"
        ),
        params![
            booking.id,
            booking.customer_id,
            booking.partner_id,
            serde_json::to_string(&booking.service)?,
            serde_json::to_string(&booking.add_ons)?,
            serde_json::to_string(&booking.address)?,
            booking.scheduled_date.format(DATE_FORMAT).to_string(),
            booking.scheduled_time,
            booking.status.as_str(),
            booking.subtotal,
            booking.tax,
            booking.total_amount,
            booking.payment_method.as_str(),
            booking.payment_status.as_str(),
            booking.rating,
            booking.review,
            booking.created_at.format(TIMESTAMP_FORMAT).to_string(),
            booking.updated_at.format(TIMESTAMP_FORMAT).to_string(),
        ],
    )?;
    Ok(())
}

fn parse_booking_row(row: &Row) -> anyhow::Result<Booking> {
    let service: String = row.get(3)?;
    let add_ons: String = row.get(4)?;
    let address: String = row.get(5)?;
    let scheduled_date: String = row.get(6)?;
    let status: String = row.get(8)?;
    let payment_method: String = row.get(12)?;
    let payment_status: String = row.get(13)?;
    let created_at: String = row.get(16)?;
    let updated_at: String = row.get(17)?;

    Ok(Booking {
        id: row.get(0)?,
        customer_id: row.get(1)?,
        partner_id: row.get(2)?,
        service: serde_json::from_str(&service)?,
        add_ons: serde_json::from_str(&add_ons)?,
        address: serde_json::from_str(&address)?,
        scheduled_date: NaiveDate::parse_from_str(&scheduled_date, DATE_FORMAT)?,
        scheduled_time: row.get(7)?,
        status: BookingStatus::parse(&status).ok_or_else(|| anyhow!("unknown booking status: {status}"))?,
        subtotal: row.get(9)?,
        tax: row.get(10)?,
        total_amount: row.get(11)?,
        payment_method: PaymentMethod::parse(&payment_method)
            .ok_or_else(|| anyhow!("unknown payment method: {payment_method}"))?,
        payment_status: PaymentStatus::parse(&payment_status)
            .ok_or_else(|| anyhow!("unknown payment status: {payment_status}"))?,
        rating: row.get(14)?,
        review: row.get(15)?,
        created_at: parse_timestamp(&created_at),
        updated_at: parse_timestamp(&updated_at),
    })
}

fn query_bookings(
    conn: &Connection,
    sql: &str,
    params: impl rusqlite::Params,
) -> anyhow::Result<Vec<Booking>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params, |row| Ok(parse_booking_row(row)))?;

    let mut bookings = vec![];
    for row in rows {
        bookings.push(row??);
    }
    Ok(bookings)
}

pub fn get_booking(conn: &Connection, id: &str) -> anyhow::Result<Option<Booking>> {
    let mut bookings = query_bookings(
        conn,
        &format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = ?1"),
        params![id],
    )?;
    Ok(bookings.pop())
}

/// Newest appointment first, the order of the "My Bookings" screen.
pub fn list_bookings_for_customer(conn: &Connection, customer_id: &str) -> anyhow::Result<Vec<Booking>> {
    query_bookings(
        conn,
        &format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE customer_id = ?1
             ORDER BY scheduled_date DESC, created_at DESC"
        ),
        params![customer_id],
    )
}

pub fn list_bookings(conn: &Connection, status: Option<BookingStatus>) -> anyhow::Result<Vec<Booking>> {
    match status {
        Some(status) => query_bookings(
            conn,
            &format!(
                "SELECT {BOOKING_COLUMNS} FROM bookings WHERE status = ?1
                 ORDER BY scheduled_date DESC, created_at DESC"
            ),
            params![status.as_str()],
        ),
        None => query_bookings(
            conn,
            &format!("SELECT {BOOKING_COLUMNS} FROM bookings ORDER BY scheduled_date DESC, created_at DESC"),
            [],
        ),
    }
}

pub fn update_booking_status(conn: &Connection, id: &str, status: BookingStatus) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE bookings SET status = ?1, updated_at = ?2 WHERE id = ?3",
        params![status.as_str(), now_string(), id],
    )?;
    Ok(count > 0)
}

/// Only a booking that is still open can be cancelled; returns false otherwise.
pub fn cancel_booking(conn: &Connection, id: &str) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE bookings SET status = ?1, updated_at = ?2
         WHERE id = ?3 AND status NOT IN ('completed', 'cancelled')",
        params![BookingStatus::Cancelled.as_str(), now_string(), id],
    )?;
    Ok(count > 0)
}

pub fn assign_partner(conn: &Connection, id: &str, partner_id: &str) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE bookings SET partner_id = ?1, status = ?2, updated_at = ?3 WHERE id = ?4",
        params![partner_id, BookingStatus::PartnerAssigned.as_str(), now_string(), id],
    )?;
    Ok(count > 0)
}

/// Settles a cash payment once the job is done.
pub fn complete_booking(conn: &Connection, id: &str) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE bookings SET status = ?1, payment_status = ?2, updated_at = ?3 WHERE id = ?4",
        params![
            BookingStatus::Completed.as_str(),
            PaymentStatus::Completed.as_str(),
            now_string(),
            id
        ],
    )?;
    Ok(count > 0)
}

pub fn save_review(conn: &Connection, id: &str, rating: u8, review: Option<&str>) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE bookings SET rating = ?1, review = ?2, updated_at = ?3
         WHERE id = ?4 AND status = 'completed' AND rating IS NULL",
        params![rating, review, now_string(), id],
    )?;
    Ok(count > 0)
}

#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct BookingStats {
    pub total_bookings: i64,
    pub pending: i64,
    pub confirmed: i64,
    pub partner_assigned: i64,
    pub started: i64,
    pub completed: i64,
    pub cancelled: i64,
    pub revenue: i64,
    pub users: i64,
}

pub fn booking_stats(conn: &Connection) -> anyhow::Result<BookingStats> {
    let mut stats = BookingStats::default();

    let mut stmt = conn.prepare("SELECT status, COUNT(*) FROM bookings GROUP BY status")?;
    let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))?;
    for row in rows {
        let (status, count) = row?;
        stats.total_bookings += count;
        match BookingStatus::parse(&status) {
            Some(BookingStatus::Pending) => stats.pending = count,
            Some(BookingStatus::Confirmed) => stats.confirmed = count,
            Some(BookingStatus::PartnerAssigned) => stats.partner_assigned = count,
            Some(BookingStatus::Started) => stats.started = count,
            Some(BookingStatus::Completed) => stats.completed = count,
            Some(BookingStatus::Cancelled) => stats.cancelled = count,
            None => tracing::warn!(status = %status, "unknown booking status in stats"),
        }
    }

    stats.revenue = conn.query_row(
        "SELECT COALESCE(SUM(total_amount), 0) FROM bookings WHERE status = 'completed'",
        [],
        |row| row.get(0),
    )?;
    stats.users = count_users(conn)?;

    Ok(stats)
}
