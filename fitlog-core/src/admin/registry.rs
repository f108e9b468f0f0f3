//! Static admin registration: one `ModelAdmin` per entity, fixed at compile time.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::admin::forms::FieldSpec;
use crate::admin::users::PROFILE_FIELDS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Entity {
    User,
    UserWeight,
    Food,
    FoodEaten,
    Exercise,
    ExercisePerformed,
    Muscle,
}

impl Entity {
    /// Registration order.
    pub const ALL: &'static [Entity] = &[
        Entity::User,
        Entity::UserWeight,
        Entity::Food,
        Entity::FoodEaten,
        Entity::Exercise,
        Entity::ExercisePerformed,
        Entity::Muscle,
    ];

    pub fn slug(self) -> &'static str {
        match self {
            Entity::User => "user",
            Entity::UserWeight => "userweight",
            Entity::Food => "food",
            Entity::FoodEaten => "foodeaten",
            Entity::Exercise => "exercise",
            Entity::ExercisePerformed => "exerciseperformed",
            Entity::Muscle => "muscle",
        }
    }

    pub fn table(self) -> &'static str {
        match self {
            Entity::User => "users",
            Entity::UserWeight => "user_weights",
            Entity::Food => "foods",
            Entity::FoodEaten => "food_eaten",
            Entity::Exercise => "exercises",
            Entity::ExercisePerformed => "exercise_performed",
            Entity::Muscle => "muscles",
        }
    }

    pub fn admin(self) -> &'static ModelAdmin {
        let index = match self {
            Entity::User => 0,
            Entity::UserWeight => 1,
            Entity::Food => 2,
            Entity::FoodEaten => 3,
            Entity::Exercise => 4,
            Entity::ExercisePerformed => 5,
            Entity::Muscle => 6,
        };
        &REGISTRY[index]
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.admin().verbose_name)
    }
}

impl FromStr for Entity {
    type Err = String;

    /// Accepts the slug in any case, with or without `_`, `-` or spaces.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted: String = s
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .collect::<String>()
            .to_lowercase();
        Entity::ALL
            .iter()
            .copied()
            .find(|e| e.slug() == wanted || e.table().replace('_', "") == wanted)
            .ok_or_else(|| {
                let known: Vec<&str> = Entity::ALL.iter().map(|e| e.slug()).collect();
                format!("unknown entity {:?}, expected one of {}", s, known.join(", "))
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ListColumn {
    pub name: &'static str,
    pub header: &'static str,
}

/// Column showing the record's display label.
pub const LABEL_COLUMN: &str = "__str__";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum InlineStyle {
    Stacked,
    Tabular,
}

/// Related record edited inside its parent's change form.
#[derive(Debug, Clone, Copy)]
pub struct InlineAdmin {
    /// Prefix of the inline's keys in submitted form data.
    pub name: &'static str,
    pub verbose_name_plural: &'static str,
    pub fk_name: &'static str,
    pub can_delete: bool,
    pub style: InlineStyle,
    pub fields: &'static [FieldSpec],
}

#[derive(Debug, Clone, Copy)]
pub struct ModelAdmin {
    pub entity: Entity,
    pub verbose_name: &'static str,
    pub verbose_name_plural: &'static str,
    pub list_display: &'static [ListColumn],
    pub search_fields: &'static [&'static str],
    pub raw_id_fields: &'static [&'static str],
    pub ordering: &'static [&'static str],
    pub inlines: &'static [InlineAdmin],
}

impl ModelAdmin {
    /// Inlines shown for an object. The add form has none: the related
    /// records only exist once the object does.
    pub fn inline_instances(&self, object_id: Option<i64>) -> &'static [InlineAdmin] {
        match object_id {
            Some(_) => self.inlines,
            None => &[],
        }
    }

    pub fn is_raw_id_field(&self, field: &str) -> bool {
        self.raw_id_fields.contains(&field)
    }

    pub fn headers(&self) -> Vec<&'static str> {
        self.list_display
            .iter()
            .map(|c| {
                if c.name == LABEL_COLUMN {
                    self.verbose_name
                } else {
                    c.header
                }
            })
            .collect()
    }
}

const DEFAULT_LIST_DISPLAY: &[ListColumn] = &[ListColumn {
    name: LABEL_COLUMN,
    header: "",
}];

const PROFILE_INLINE: InlineAdmin = InlineAdmin {
    name: "profile",
    verbose_name_plural: "Profile",
    fk_name: "user",
    can_delete: false,
    style: InlineStyle::Stacked,
    fields: PROFILE_FIELDS,
};

pub static REGISTRY: [ModelAdmin; 7] = [
    ModelAdmin {
        entity: Entity::User,
        verbose_name: "user",
        verbose_name_plural: "users",
        list_display: &[
            ListColumn { name: "username", header: "Username" },
            ListColumn { name: "email", header: "Email address" },
            ListColumn { name: "first_name", header: "First name" },
            ListColumn { name: "last_name", header: "Last name" },
            ListColumn { name: "is_staff", header: "Staff status" },
            ListColumn { name: "goal", header: "Goal" },
        ],
        search_fields: &["username", "first_name", "last_name", "email"],
        raw_id_fields: &[],
        ordering: &["username"],
        inlines: &[PROFILE_INLINE],
    },
    ModelAdmin {
        entity: Entity::UserWeight,
        verbose_name: "user weight",
        verbose_name_plural: "user weights",
        list_display: DEFAULT_LIST_DISPLAY,
        search_fields: &["user__username"],
        raw_id_fields: &[],
        ordering: &["user", "-date"],
        inlines: &[],
    },
    ModelAdmin {
        entity: Entity::Food,
        verbose_name: "food",
        verbose_name_plural: "foods",
        list_display: DEFAULT_LIST_DISPLAY,
        search_fields: &["name"],
        raw_id_fields: &[],
        ordering: &["name"],
        inlines: &[],
    },
    ModelAdmin {
        entity: Entity::FoodEaten,
        verbose_name: "food eaten",
        verbose_name_plural: "foods eaten",
        list_display: DEFAULT_LIST_DISPLAY,
        search_fields: &["user__username", "food__name"],
        raw_id_fields: &[],
        ordering: &["user", "-date"],
        inlines: &[],
    },
    ModelAdmin {
        entity: Entity::Exercise,
        verbose_name: "exercise",
        verbose_name_plural: "exercises",
        list_display: DEFAULT_LIST_DISPLAY,
        search_fields: &["name"],
        raw_id_fields: &[],
        ordering: &["name"],
        inlines: &[],
    },
    ModelAdmin {
        entity: Entity::ExercisePerformed,
        verbose_name: "exercise performed",
        verbose_name_plural: "exercises performed",
        list_display: DEFAULT_LIST_DISPLAY,
        search_fields: &["user__username", "exercise__name"],
        raw_id_fields: &["exercise"],
        ordering: &["user", "-date"],
        inlines: &[],
    },
    ModelAdmin {
        entity: Entity::Muscle,
        verbose_name: "muscle",
        verbose_name_plural: "muscles",
        list_display: DEFAULT_LIST_DISPLAY,
        search_fields: &["name"],
        raw_id_fields: &[],
        ordering: &["name"],
        inlines: &[],
    },
];
