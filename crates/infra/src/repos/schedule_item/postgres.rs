use super::IScheduleItemRepo;
use anyhow::Context;
use chrono::NaiveDate;
use mypa_reminders_domain::{
    AlarmRepeat, ItemKind, ItemRef, ItemTiming, OwnerId, Presentation, ScheduleItem, TimeOfDay,
    VoiceGender, Weekday,
};
use sqlx::{FromRow, PgPool};
use tracing::{error, warn};

pub struct PostgresScheduleItemRepo {
    pool: PgPool,
}

impl PostgresScheduleItemRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct PresentationRaw {
    title: String,
    text: Option<String>,
    audio_ref: Option<String>,
    image_ref: Option<String>,
    duration_seconds: i32,
    looping: bool,
    language: String,
    voice_gender: String,
}

#[derive(Debug, FromRow)]
struct AlarmRaw {
    alarm_id: i64,
    owner_id: String,
    active: bool,
    time_of_day: String,
    recurring_days: Vec<String>,
    specific_date: Option<NaiveDate>,
    #[sqlx(flatten)]
    presentation: PresentationRaw,
}

#[derive(Debug, FromRow)]
struct MedicineRaw {
    medicine_id: i64,
    owner_id: String,
    active: bool,
    times_of_day: Vec<String>,
    #[sqlx(flatten)]
    presentation: PresentationRaw,
}

#[derive(Debug, FromRow)]
struct MeetingRaw {
    meeting_id: i64,
    owner_id: String,
    enabled: bool,
    time_of_day: String,
    meeting_date: NaiveDate,
    location: Option<String>,
    #[sqlx(flatten)]
    presentation: PresentationRaw,
}

impl TryFrom<PresentationRaw> for Presentation {
    type Error = anyhow::Error;

    fn try_from(raw: PresentationRaw) -> anyhow::Result<Self> {
        let voice_gender = match raw.voice_gender.as_str() {
            "male" => VoiceGender::Male,
            _ => VoiceGender::Female,
        };
        Ok(Self {
            title: raw.title,
            text: raw.text,
            audio_ref: raw.audio_ref,
            image_ref: raw.image_ref,
            duration_seconds: u32::try_from(raw.duration_seconds)
                .context("Negative presentation duration")?,
            looping: raw.looping,
            language: raw.language,
            voice_gender,
        })
    }
}

impl TryFrom<AlarmRaw> for ScheduleItem {
    type Error = anyhow::Error;

    fn try_from(raw: AlarmRaw) -> anyhow::Result<Self> {
        let recurring_days = raw
            .recurring_days
            .iter()
            .map(|day| {
                day.parse::<Weekday>()
                    .map_err(|_| anyhow::anyhow!("Invalid weekday: {}", day))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;
        Ok(Self {
            id: raw.alarm_id,
            owner_id: OwnerId::new(raw.owner_id),
            active: raw.active,
            presentation: raw.presentation.try_into()?,
            timing: ItemTiming::Alarm {
                time_of_day: raw.time_of_day.parse()?,
                repeat: AlarmRepeat::from_parts(recurring_days, raw.specific_date)?,
            },
        })
    }
}

impl TryFrom<MedicineRaw> for ScheduleItem {
    type Error = anyhow::Error;

    fn try_from(raw: MedicineRaw) -> anyhow::Result<Self> {
        let times_of_day = raw
            .times_of_day
            .iter()
            .map(|time| time.parse::<TimeOfDay>())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            id: raw.medicine_id,
            owner_id: OwnerId::new(raw.owner_id),
            active: raw.active,
            presentation: raw.presentation.try_into()?,
            timing: ItemTiming::Medicine { times_of_day },
        })
    }
}

impl TryFrom<MeetingRaw> for ScheduleItem {
    type Error = anyhow::Error;

    fn try_from(raw: MeetingRaw) -> anyhow::Result<Self> {
        Ok(Self {
            id: raw.meeting_id,
            owner_id: OwnerId::new(raw.owner_id),
            active: raw.enabled,
            presentation: raw.presentation.try_into()?,
            timing: ItemTiming::Meeting {
                time_of_day: raw.time_of_day.parse()?,
                date: raw.meeting_date,
                location: raw.location,
            },
        })
    }
}

/// Converts the rows and skips the ones that can not be understood,
/// one malformed row should not hide all the others
fn into_items<R>(rows: Vec<R>, kind: ItemKind) -> Vec<ScheduleItem>
where
    R: TryInto<ScheduleItem, Error = anyhow::Error>,
{
    rows.into_iter()
        .filter_map(|row| match row.try_into() {
            Ok(item) => Some(item),
            Err(e) => {
                warn!("Skipping malformed {} row: {:?}", kind, e);
                None
            }
        })
        .collect()
}

const PRESENTATION_COLUMNS: &str =
    "title, text, audio_ref, image_ref, duration_seconds, looping, language, voice_gender";

fn voice_gender_column(gender: VoiceGender) -> &'static str {
    match gender {
        VoiceGender::Female => "female",
        VoiceGender::Male => "male",
    }
}

impl PostgresScheduleItemRepo {
    async fn find_alarms(&self, filter: &str, owner_id: Option<&OwnerId>) -> anyhow::Result<Vec<ScheduleItem>> {
        let rows: Vec<AlarmRaw> = sqlx::query_as(&format!(
            "SELECT alarm_id, owner_id, active, time_of_day, recurring_days, specific_date, {} FROM alarms {}",
            PRESENTATION_COLUMNS, filter
        ))
        .bind(owner_id.map(|o| o.as_str().to_string()))
        .fetch_all(&self.pool)
        .await?;
        Ok(into_items(rows, ItemKind::Alarm))
    }

    async fn find_medicines(&self, filter: &str, owner_id: Option<&OwnerId>) -> anyhow::Result<Vec<ScheduleItem>> {
        let rows: Vec<MedicineRaw> = sqlx::query_as(&format!(
            "SELECT medicine_id, owner_id, active, times_of_day, {} FROM medicines {}",
            PRESENTATION_COLUMNS, filter
        ))
        .bind(owner_id.map(|o| o.as_str().to_string()))
        .fetch_all(&self.pool)
        .await?;
        Ok(into_items(rows, ItemKind::Medicine))
    }

    async fn find_meetings(&self, filter: &str, owner_id: Option<&OwnerId>) -> anyhow::Result<Vec<ScheduleItem>> {
        let rows: Vec<MeetingRaw> = sqlx::query_as(&format!(
            "SELECT meeting_id, owner_id, enabled, time_of_day, meeting_date, location, {} FROM meetings {}",
            PRESENTATION_COLUMNS, filter
        ))
        .bind(owner_id.map(|o| o.as_str().to_string()))
        .fetch_all(&self.pool)
        .await?;
        Ok(into_items(rows, ItemKind::Meeting))
    }
}

#[async_trait::async_trait]
impl IScheduleItemRepo for PostgresScheduleItemRepo {
    async fn insert(&self, item: &ScheduleItem) -> anyhow::Result<()> {
        let p = &item.presentation;
        let duration_seconds = i32::try_from(p.duration_seconds)?;
        match &item.timing {
            ItemTiming::Alarm {
                time_of_day,
                repeat,
            } => {
                let days = repeat
                    .recurring_days()
                    .iter()
                    .map(|day| day.to_string())
                    .collect::<Vec<_>>();
                sqlx::query(
                    r#"
                    INSERT INTO alarms
                    (alarm_id, owner_id, active, time_of_day, recurring_days, specific_date,
                     title, text, audio_ref, image_ref, duration_seconds, looping, language, voice_gender)
                    VALUES($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
                    "#,
                )
                .bind(item.id)
                .bind(item.owner_id.as_str())
                .bind(item.active)
                .bind(time_of_day.to_string())
                .bind(&days)
                .bind(repeat.specific_date())
                .bind(&p.title)
                .bind(&p.text)
                .bind(&p.audio_ref)
                .bind(&p.image_ref)
                .bind(duration_seconds)
                .bind(p.looping)
                .bind(&p.language)
                .bind(voice_gender_column(p.voice_gender))
                .execute(&self.pool)
                .await?;
            }
            ItemTiming::Medicine { times_of_day } => {
                let times = times_of_day
                    .iter()
                    .map(|time| time.to_string())
                    .collect::<Vec<_>>();
                sqlx::query(
                    r#"
                    INSERT INTO medicines
                    (medicine_id, owner_id, active, times_of_day,
                     title, text, audio_ref, image_ref, duration_seconds, looping, language, voice_gender)
                    VALUES($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
                    "#,
                )
                .bind(item.id)
                .bind(item.owner_id.as_str())
                .bind(item.active)
                .bind(&times)
                .bind(&p.title)
                .bind(&p.text)
                .bind(&p.audio_ref)
                .bind(&p.image_ref)
                .bind(duration_seconds)
                .bind(p.looping)
                .bind(&p.language)
                .bind(voice_gender_column(p.voice_gender))
                .execute(&self.pool)
                .await?;
            }
            ItemTiming::Meeting {
                time_of_day,
                date,
                location,
            } => {
                sqlx::query(
                    r#"
                    INSERT INTO meetings
                    (meeting_id, owner_id, enabled, time_of_day, meeting_date, location,
                     title, text, audio_ref, image_ref, duration_seconds, looping, language, voice_gender)
                    VALUES($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
                    "#,
                )
                .bind(item.id)
                .bind(item.owner_id.as_str())
                .bind(item.active)
                .bind(time_of_day.to_string())
                .bind(date)
                .bind(location)
                .bind(&p.title)
                .bind(&p.text)
                .bind(&p.audio_ref)
                .bind(&p.image_ref)
                .bind(duration_seconds)
                .bind(p.looping)
                .bind(&p.language)
                .bind(voice_gender_column(p.voice_gender))
                .execute(&self.pool)
                .await?;
            }
        };
        Ok(())
    }

    async fn find(&self, item: &ItemRef) -> anyhow::Result<Option<ScheduleItem>> {
        let res = match item.kind {
            ItemKind::Alarm => {
                sqlx::query_as::<_, AlarmRaw>(&format!(
                    "SELECT alarm_id, owner_id, active, time_of_day, recurring_days, specific_date, {} FROM alarms WHERE alarm_id = $1",
                    PRESENTATION_COLUMNS
                ))
                .bind(item.id)
                .fetch_optional(&self.pool)
                .await
                .map(|row| row.map(ScheduleItem::try_from))
            }
            ItemKind::Medicine => {
                sqlx::query_as::<_, MedicineRaw>(&format!(
                    "SELECT medicine_id, owner_id, active, times_of_day, {} FROM medicines WHERE medicine_id = $1",
                    PRESENTATION_COLUMNS
                ))
                .bind(item.id)
                .fetch_optional(&self.pool)
                .await
                .map(|row| row.map(ScheduleItem::try_from))
            }
            ItemKind::Meeting => {
                sqlx::query_as::<_, MeetingRaw>(&format!(
                    "SELECT meeting_id, owner_id, enabled, time_of_day, meeting_date, location, {} FROM meetings WHERE meeting_id = $1",
                    PRESENTATION_COLUMNS
                ))
                .bind(item.id)
                .fetch_optional(&self.pool)
                .await
                .map(|row| row.map(ScheduleItem::try_from))
            }
        };
        match res {
            Ok(Some(Ok(item))) => Ok(Some(item)),
            Ok(Some(Err(e))) => {
                warn!("Found malformed {}: {:?}", item, e);
                Ok(None)
            }
            Ok(None) => Ok(None),
            Err(e) => {
                error!("Unable to look up {}: {:?}", item, e);
                Err(e.into())
            }
        }
    }

    async fn find_active(&self, owner_id: Option<&OwnerId>) -> anyhow::Result<Vec<ScheduleItem>> {
        // `$1` is NULL when looking across all owners
        let active = "WHERE active AND ($1::text IS NULL OR owner_id = $1)";
        let enabled = "WHERE enabled AND ($1::text IS NULL OR owner_id = $1)";

        let mut items = self.find_alarms(active, owner_id).await?;
        items.extend(self.find_medicines(active, owner_id).await?);
        items.extend(self.find_meetings(enabled, owner_id).await?);
        Ok(items)
    }

    async fn set_active(&self, item: &ItemRef, active: bool) -> anyhow::Result<bool> {
        let query = match item.kind {
            ItemKind::Alarm => "UPDATE alarms SET active = $2 WHERE alarm_id = $1",
            ItemKind::Medicine => "UPDATE medicines SET active = $2 WHERE medicine_id = $1",
            ItemKind::Meeting => "UPDATE meetings SET enabled = $2 WHERE meeting_id = $1",
        };
        let rows_affected = sqlx::query(query)
            .bind(item.id)
            .bind(active)
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(rows_affected > 0)
    }
}
