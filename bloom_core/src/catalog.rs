//! Default catalog of workouts and exercise substitutions.
//!
//! This module provides the built-in content for the system: three workouts
//! per cycle phase, plus the low-impact and standing substitution tables.

use crate::types::*;
use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};

/// Cached default catalog - built once and reused across all operations
static DEFAULT_CATALOG: Lazy<Catalog> = Lazy::new(build_default_catalog_internal);

/// Get a reference to the cached default catalog
pub fn get_default_catalog() -> &'static Catalog {
    &DEFAULT_CATALOG
}

/// Builds the default catalog
///
/// **Note**: For production use, prefer `get_default_catalog()` which returns a
/// cached reference. This function is retained for testing and custom catalog creation.
pub fn build_default_catalog() -> Catalog {
    build_default_catalog_internal()
}

fn ex(
    name: &str,
    duration_seconds: u32,
    kind: ExerciseKind,
    impact: Impact,
    requires_floor: bool,
    muscle_group: &str,
    cue: &str,
) -> Exercise {
    Exercise {
        name: name.into(),
        duration_seconds,
        kind,
        impact,
        requires_floor,
        cue: cue.into(),
        muscle_group: muscle_group.into(),
    }
}

fn rest(name: &str, duration_seconds: u32, cue: &str) -> Exercise {
    ex(name, duration_seconds, ExerciseKind::Rest, Impact::Low, false, "", cue)
}

fn table(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(from, to)| (from.to_string(), to.to_string()))
        .collect()
}

fn build_substitutions() -> SubstitutionTables {
    SubstitutionTables {
        low_impact: table(&[
            ("Squat Jumps", "Fast bodyweight squats"),
            ("Jumping Jacks", "Marching in place with arm raises"),
            ("Box Jumps", "Step-ups at a brisk pace"),
            ("Burpees", "Squat to standing reach"),
            ("High Knees", "Marching with high knees (no hop)"),
            ("Jump Lunges", "Alternating reverse lunges"),
            ("Tuck Jumps", "Fast air squats"),
            ("Mountain Climbers", "Standing knee drives"),
            ("Plyo Push-ups", "Regular push-ups with pause"),
            ("Star Jumps", "Standing lateral arm raises with calf raise"),
            ("Speed Skaters", "Side step-touches"),
            ("Broad Jumps", "Long stride walking lunges"),
            ("Pop Squats", "Wide-to-narrow squat steps"),
        ]),
        standing: table(&[
            ("Cat-Cow", "Standing Cat-Cow (hands on thighs)"),
            ("Child's Pose", "Standing forward fold with bent knees"),
            ("Supine Twist", "Standing twist with arms extended"),
            ("Figure-4 Stretch", "Standing figure-4 (hold wall for balance)"),
            ("Legs Up the Wall", "Standing calf raises with wall support"),
            ("Push-ups", "Wall push-ups"),
            ("Plank Hold", "Wall plank (hands on wall, body angled)"),
            ("Glute Bridge", "Standing hip extension (hold wall)"),
            ("Mountain Climbers", "Standing knee drives"),
            ("Burpees", "Squat to standing reach"),
            ("Plyo Push-ups", "Wall push-ups with push off"),
            ("Dead Bug", "Standing march with opposite arm reach"),
            ("Bicycle Crunches", "Standing oblique knee-to-elbow"),
            ("Side Plank", "Standing side lean with arm overhead"),
        ]),
    }
}

/// Internal function that actually builds the catalog
fn build_default_catalog_internal() -> Catalog {
    let mut workouts = Vec::new();

    workouts.push(Workout {
        id: "m0".into(),
        title: "2-Min Bloom Reset".into(),
        subtitle: "A micro-dose of movement for low days".into(),
        phase: Phase::Menstrual,
        difficulty: 1,
        xp: 8,
        warmup_note: Some("No warmup needed — this is already gentle.".into()),
        unlock: None,
        exercises: vec![
            ex("Standing Cat-Cow", 30, ExerciseKind::Flow, Impact::Low, false, "Spine", "Hands on thighs. Round your spine on exhale, arch gently on inhale."),
            ex("Shoulder Rolls", 20, ExerciseKind::Flow, Impact::Low, false, "Shoulders", "Big slow circles. Let tension melt out of your neck."),
            ex("Side Stretch", 25, ExerciseKind::Flow, Impact::Low, false, "Obliques", "Reach one arm overhead, lean gently. Breathe into the stretch."),
            rest("Rest", 10, "You showed up. That's the whole workout today."),
            ex("Gentle Twist", 25, ExerciseKind::Flow, Impact::Low, false, "Spine", "Feet planted, rotate your torso side to side. Easy and loose."),
            ex("Deep Breathing", 20, ExerciseKind::Flow, Impact::Low, false, "Core", "In for 4, hold for 4, out for 6. You're done."),
        ],
    });

    workouts.push(Workout {
        id: "m1".into(),
        title: "Gentle Restore".into(),
        subtitle: "Ease tension without taxing your body".into(),
        phase: Phase::Menstrual,
        difficulty: 2,
        xp: 18,
        warmup_note: Some("Start with gentle breathing — your body will guide the pace.".into()),
        unlock: None,
        exercises: vec![
            ex("Diaphragmatic Breathing", 40, ExerciseKind::Flow, Impact::Low, false, "Core", "Hand on belly. Breathe deep into your hand. Slow exhale."),
            ex("Neck Circles", 30, ExerciseKind::Flow, Impact::Low, false, "Neck", "Slow, gentle circles. Pause anywhere that feels tight."),
            ex("Cat-Cow", 45, ExerciseKind::Flow, Impact::Low, true, "Spine", "On all fours. Arch and round with your breath."),
            rest("Rest", 20, "Take a moment. No rush."),
            ex("Child's Pose", 50, ExerciseKind::Hold, Impact::Low, true, "Back/Hips", "Knees wide, arms forward. Breathe into your lower back."),
            ex("Supine Twist", 45, ExerciseKind::Flow, Impact::Low, true, "Spine", "On your back, knees to one side. Let gravity do the work."),
            rest("Rest", 15, "Almost there. You're doing great."),
            ex("Hip Circles", 40, ExerciseKind::Flow, Impact::Low, false, "Hips", "Standing or all fours. Gentle circles with your hips."),
            ex("Figure-4 Stretch", 50, ExerciseKind::Hold, Impact::Low, true, "Glutes/Hips", "Ankle on opposite knee. Gentle pull toward you."),
            ex("Legs Up the Wall", 60, ExerciseKind::Hold, Impact::Low, true, "Legs/Back", "Legs up, back flat. Close your eyes if you want."),
            rest("Final Rest", 30, "You gave your body exactly what it needed today."),
        ],
    });

    workouts.push(Workout {
        id: "m2".into(),
        title: "Seated Calm".into(),
        subtitle: "Gentle relief without leaving your chair".into(),
        phase: Phase::Menstrual,
        difficulty: 1,
        xp: 10,
        warmup_note: Some("Sit comfortably. Feet flat on the floor. That's your starting position.".into()),
        unlock: None,
        exercises: vec![
            ex("Seated Neck Stretch", 30, ExerciseKind::Flow, Impact::Low, false, "Neck", "Ear to shoulder, hold, switch sides. Let the weight of your head do the work."),
            ex("Seated Shoulder Shrugs", 25, ExerciseKind::Flow, Impact::Low, false, "Shoulders", "Shoulders up to ears, hold 3 seconds, drop. Feel the release."),
            ex("Seated Spinal Twist", 35, ExerciseKind::Flow, Impact::Low, false, "Spine", "Hand on opposite knee, look behind you. Gentle, never force."),
            rest("Rest", 15, "Close your eyes for a moment if you want."),
            ex("Seated Cat-Cow", 30, ExerciseKind::Flow, Impact::Low, false, "Spine", "Hands on knees. Round forward on exhale, arch on inhale."),
            ex("Ankle Circles", 25, ExerciseKind::Flow, Impact::Low, false, "Ankles", "Lift one foot, circle the ankle. Switch after 5 circles each way."),
            ex("Seated Side Stretch", 30, ExerciseKind::Flow, Impact::Low, false, "Obliques", "One arm overhead, lean to the side. Breathe into the stretch."),
            ex("Closing Breaths", 25, ExerciseKind::Flow, Impact::Low, false, "Core", "Three deep breaths. In through nose, out through mouth. You're done."),
        ],
    });

    workouts.push(Workout {
        id: "f1".into(),
        title: "Foundation Build".into(),
        subtitle: "Compound strength while estrogen rises".into(),
        phase: Phase::Follicular,
        difficulty: 3,
        xp: 32,
        warmup_note: Some("Light cardio + dynamic stretches to prep your joints.".into()),
        unlock: None,
        exercises: vec![
            ex("Arm Circles", 30, ExerciseKind::Flow, Impact::Low, false, "Shoulders", "Big circles forward, then back. Wake up those shoulders."),
            ex("Bodyweight Squats", 40, ExerciseKind::Strength, Impact::Low, false, "Quads/Glutes", "Feet shoulder-width. Sit back like there's a chair. Drive through heels."),
            ex("Push-ups", 40, ExerciseKind::Strength, Impact::Low, true, "Chest/Triceps", "Hands just outside shoulders. Lower with control. Knees down is totally fine."),
            rest("Rest", 30, "Shake it out. Sip water if you need."),
            ex("Goblet Squat", 45, ExerciseKind::Strength, Impact::Low, false, "Quads/Glutes", "Hold weight at chest. Sit deep, elbows inside knees."),
            ex("Bent-Over Row", 45, ExerciseKind::Strength, Impact::Low, false, "Back/Biceps", "Hinge at hips, pull elbows back. Squeeze shoulder blades together."),
            rest("Rest", 25, "You're building something. Rest is part of it."),
            ex("Lunges", 45, ExerciseKind::Strength, Impact::Low, false, "Quads/Glutes", "Step forward, lower until both knees at 90°. Alternate legs."),
            ex("Plank Hold", 35, ExerciseKind::Hold, Impact::Low, true, "Core", "Forearms down, body straight as a board. Breathe."),
            rest("Rest", 20, "Last push coming up. You've got this."),
            ex("Glute Bridge", 40, ExerciseKind::Strength, Impact::Low, true, "Glutes/Hamstrings", "On your back, feet flat. Drive hips up, squeeze at top."),
            ex("Cool Down Stretch", 45, ExerciseKind::Flow, Impact::Low, false, "Full Body", "Slow stretches for whatever feels tight. You earned this."),
        ],
    });

    workouts.push(Workout {
        id: "f2".into(),
        title: "Cardio Ignite".into(),
        subtitle: "Elevate your heart rate while energy climbs".into(),
        phase: Phase::Follicular,
        difficulty: 3,
        xp: 28,
        warmup_note: Some("Light jog in place + arm swings to get blood flowing.".into()),
        unlock: Some(UnlockRequirement { phase: Phase::Follicular, workouts_needed: 2 }),
        exercises: vec![
            ex("Jumping Jacks", 40, ExerciseKind::Cardio, Impact::High, false, "Full Body", "Classic! Arms all the way up, land soft."),
            ex("High Knees", 35, ExerciseKind::Cardio, Impact::High, false, "Core/Legs", "Drive knees up fast. Pump those arms."),
            rest("Rest", 25, "Breathe. Heart rate coming down is normal."),
            ex("Mountain Climbers", 35, ExerciseKind::Cardio, Impact::High, true, "Core/Shoulders", "Plank position, drive knees to chest. Fast feet!"),
            ex("Squat Jumps", 30, ExerciseKind::Cardio, Impact::High, false, "Quads/Glutes", "Squat deep, explode up. Land soft, repeat."),
            rest("Rest", 30, "Halfway there. You're crushing it."),
            ex("Burpees", 35, ExerciseKind::Cardio, Impact::High, true, "Full Body", "Down, jump feet back, push-up, jump up. Modify as needed."),
            ex("Fast Feet", 30, ExerciseKind::Cardio, Impact::Low, false, "Calves/Cardio", "Quick small steps in place. Stay light on your toes."),
            rest("Rest", 20, "Last round. Give what you've got left."),
            ex("Star Jumps", 30, ExerciseKind::Cardio, Impact::High, false, "Full Body", "Jump and spread arms and legs wide like a star!"),
            ex("Cool Down Walk", 40, ExerciseKind::Flow, Impact::Low, false, "Recovery", "Walk in place. Slow it down. Let your heart rate settle."),
        ],
    });

    workouts.push(Workout {
        id: "f3".into(),
        title: "Upper Body Sculpt".into(),
        subtitle: "Shoulders, back, and arms as strength builds".into(),
        phase: Phase::Follicular,
        difficulty: 3,
        xp: 30,
        warmup_note: Some("Arm circles and shoulder rolls to warm up upper body.".into()),
        unlock: Some(UnlockRequirement { phase: Phase::Follicular, workouts_needed: 3 }),
        exercises: vec![
            ex("Arm Circles", 30, ExerciseKind::Flow, Impact::Low, false, "Shoulders", "Small circles getting bigger. Forward then backward."),
            ex("Push-ups", 45, ExerciseKind::Strength, Impact::Low, true, "Chest/Triceps", "Chest to ground, push back up. Knees down if needed — still counts."),
            ex("Bent-Over Row", 45, ExerciseKind::Strength, Impact::Low, false, "Back/Biceps", "Hinge forward, pull elbows back. Use water bottles if no weights."),
            rest("Rest", 25, "Upper body work is sneaky hard. Rest is earned."),
            ex("Shoulder Press", 40, ExerciseKind::Strength, Impact::Low, false, "Shoulders", "Press overhead, lower with control. Full extension at the top."),
            ex("Tricep Dips", 35, ExerciseKind::Strength, Impact::Low, false, "Triceps", "Hands on chair edge behind you. Lower and push up. Keep elbows tight."),
            rest("Rest", 20, "Almost there. Your arms are getting stronger."),
            ex("Plank Hold", 30, ExerciseKind::Hold, Impact::Low, true, "Core/Shoulders", "Straight body, forearms down. Core tight, breathe steady."),
            ex("Superman Hold", 30, ExerciseKind::Hold, Impact::Low, true, "Back", "Lying face down, lift arms and legs. Squeeze your back."),
            ex("Cool Down Stretch", 40, ExerciseKind::Flow, Impact::Low, false, "Upper Body", "Stretch your shoulders, chest, and arms. You built something today."),
        ],
    });

    workouts.push(Workout {
        id: "o1".into(),
        title: "Peak Power Circuit".into(),
        subtitle: "Maximum output when your body is primed".into(),
        phase: Phase::Ovulatory,
        difficulty: 5,
        xp: 38,
        warmup_note: Some("Dynamic warmup — high knees, arm swings, hip openers.".into()),
        unlock: None,
        exercises: vec![
            ex("Dynamic Warmup", 40, ExerciseKind::Cardio, Impact::Low, false, "Full Body", "Jog in place, arm swings, hip circles. Get loose."),
            ex("Jump Lunges", 35, ExerciseKind::Cardio, Impact::High, false, "Quads/Glutes", "Lunge, jump, switch legs mid-air. Land soft!"),
            ex("Plyo Push-ups", 30, ExerciseKind::Strength, Impact::High, true, "Chest/Triceps", "Push up explosively, hands leave the ground. Beast mode."),
            rest("Rest", 25, "Quick breather. You're operating at peak."),
            ex("Tuck Jumps", 30, ExerciseKind::Cardio, Impact::High, false, "Core/Legs", "Jump and bring knees to chest. Soft landing every time."),
            ex("Squat Jumps", 35, ExerciseKind::Cardio, Impact::High, false, "Quads/Glutes", "Deep squat, explosive jump. This is your peak — own it."),
            rest("Rest", 30, "Halfway. You're doing things most people won't."),
            ex("Burpees", 40, ExerciseKind::Cardio, Impact::High, true, "Full Body", "Full burpees. Down, back, push-up, jump. All out."),
            ex("Mountain Climbers", 35, ExerciseKind::Cardio, Impact::High, true, "Core/Shoulders", "Fast! Drive those knees. Core tight."),
            ex("Cool Down", 50, ExerciseKind::Flow, Impact::Low, false, "Full Body", "Deep stretches. You just peaked. Let your body land gently."),
        ],
    });

    workouts.push(Workout {
        id: "o2".into(),
        title: "Sprint Intervals".into(),
        subtitle: "Short explosive bursts at peak energy".into(),
        phase: Phase::Ovulatory,
        difficulty: 4,
        xp: 34,
        warmup_note: Some("Jog in place for 30 seconds, then dynamic leg swings.".into()),
        unlock: None,
        exercises: vec![
            ex("Light Jog", 30, ExerciseKind::Cardio, Impact::Low, false, "Full Body", "Easy pace to start. Get your legs under you."),
            ex("Speed Skaters", 30, ExerciseKind::Cardio, Impact::High, false, "Legs/Glutes", "Leap side to side, landing on one foot. Touch the ground if you can."),
            rest("Rest", 20, "Quick reset. Next one is fast."),
            ex("High Knees", 30, ExerciseKind::Cardio, Impact::High, false, "Core/Legs", "As fast as you can. Knees to hip height. Arms pumping."),
            ex("Pop Squats", 30, ExerciseKind::Cardio, Impact::High, false, "Quads/Glutes", "Jump feet wide into squat, jump feet together. Repeat fast."),
            rest("Rest", 25, "You're at your strongest this phase. Let it show."),
            ex("Jumping Jacks", 35, ExerciseKind::Cardio, Impact::High, false, "Full Body", "All the way up, all the way down. Full range."),
            ex("Broad Jumps", 25, ExerciseKind::Cardio, Impact::High, false, "Legs/Power", "Jump forward as far as you can, walk back, repeat. Explosive."),
            rest("Rest", 20, "One more burst. You've got this."),
            ex("Star Jumps", 30, ExerciseKind::Cardio, Impact::High, false, "Full Body", "Crouch, explode up, spread wide. Land soft, go again."),
            ex("Cool Down Walk", 40, ExerciseKind::Flow, Impact::Low, false, "Recovery", "Walk it off. Shake your legs. Heart rate settling is success."),
        ],
    });

    workouts.push(Workout {
        id: "o3".into(),
        title: "Full Body Power".into(),
        subtitle: "Compound movements at peak capacity".into(),
        phase: Phase::Ovulatory,
        difficulty: 5,
        xp: 40,
        warmup_note: Some("Full dynamic warmup — this one demands everything.".into()),
        unlock: Some(UnlockRequirement { phase: Phase::Ovulatory, workouts_needed: 2 }),
        exercises: vec![
            ex("Dynamic Warmup", 40, ExerciseKind::Cardio, Impact::Low, false, "Full Body", "High knees, butt kicks, arm swings. Get every joint moving."),
            ex("Squat Jumps", 35, ExerciseKind::Cardio, Impact::High, false, "Quads/Glutes", "Deep squat, explode up. Land soft. Power from the glutes."),
            ex("Push-ups", 40, ExerciseKind::Strength, Impact::Low, true, "Chest/Triceps", "Chest to floor, push up strong. These should feel powerful today."),
            rest("Rest", 25, "Quick breather. You're just getting started."),
            ex("Jump Lunges", 35, ExerciseKind::Cardio, Impact::High, false, "Legs/Glutes", "Switch legs in the air. Control the landing. Own the power."),
            ex("Bent-Over Row", 40, ExerciseKind::Strength, Impact::Low, false, "Back/Biceps", "Hinge and pull. Back muscles firing. Squeeze at the top."),
            rest("Rest", 25, "Halfway. Everything you have left — it's enough."),
            ex("Burpees", 40, ExerciseKind::Cardio, Impact::High, true, "Full Body", "Full range. Down, back, chest to floor, up, jump. All out."),
            ex("Bicycle Crunches", 35, ExerciseKind::Strength, Impact::Low, true, "Core", "On your back, elbow to opposite knee. Controlled, not fast."),
            ex("Mountain Climbers", 30, ExerciseKind::Cardio, Impact::High, true, "Core/Shoulders", "Last cardio push. Fast feet, tight core. Sprint it out."),
            ex("Cool Down", 50, ExerciseKind::Flow, Impact::Low, false, "Full Body", "Full body stretch. You just did something remarkable."),
        ],
    });

    workouts.push(Workout {
        id: "l1".into(),
        title: "Steady State".into(),
        subtitle: "Moderate consistency as progesterone rises".into(),
        phase: Phase::Luteal,
        difficulty: 3,
        xp: 24,
        warmup_note: Some("Gentle cardio — walking in place, arm circles, easy twists.".into()),
        unlock: None,
        exercises: vec![
            ex("Walking in Place", 40, ExerciseKind::Cardio, Impact::Low, false, "Full Body", "Easy pace. Swing your arms naturally."),
            ex("Wall Sit", 35, ExerciseKind::Hold, Impact::Low, false, "Quads", "Back flat against wall, thighs parallel. Hold steady."),
            ex("Standing Row", 40, ExerciseKind::Strength, Impact::Low, false, "Back", "Slight hinge, pull elbows back. Squeeze your back."),
            rest("Rest", 25, "Steady does it. No need to rush."),
            ex("Step-ups", 40, ExerciseKind::Strength, Impact::Low, false, "Quads/Glutes", "Use a stair or sturdy surface. Alternate legs."),
            ex("Shoulder Press", 35, ExerciseKind::Strength, Impact::Low, false, "Shoulders", "Press overhead, lower with control. Use water bottles if no weights."),
            rest("Rest", 20, "You're more than halfway. Consistency is strength."),
            ex("Glute Bridge", 40, ExerciseKind::Strength, Impact::Low, true, "Glutes", "Drive hips up, squeeze at top. Controlled lowering."),
            ex("Standing Side Stretch", 30, ExerciseKind::Flow, Impact::Low, false, "Obliques", "Reach up and over. Breathe into the stretch."),
            ex("Final Stretch", 40, ExerciseKind::Flow, Impact::Low, false, "Full Body", "Stretch whatever needs it most. You showed up and that matters."),
        ],
    });

    workouts.push(Workout {
        id: "l2".into(),
        title: "Tension Release".into(),
        subtitle: "Targeted relief for PMS tightness".into(),
        phase: Phase::Luteal,
        difficulty: 2,
        xp: 20,
        warmup_note: Some("Just start moving gently. Your body will tell you what it needs.".into()),
        unlock: None,
        exercises: vec![
            ex("Neck Rolls", 30, ExerciseKind::Flow, Impact::Low, false, "Neck", "Slow half-circles, ear to ear. Pause on the tight spots."),
            ex("Shoulder Shrugs", 25, ExerciseKind::Flow, Impact::Low, false, "Shoulders", "Up to ears, hold 3 seconds, drop and exhale. Feel the release."),
            ex("Standing Forward Fold", 35, ExerciseKind::Flow, Impact::Low, false, "Hamstrings/Back", "Bend at hips, let head hang heavy. Bend knees as much as you want."),
            rest("Rest", 15, "Breathe. This is about release, not effort."),
            ex("Hip Circles", 35, ExerciseKind::Flow, Impact::Low, false, "Hips", "Hands on hips, big slow circles. Reverse halfway."),
            ex("Standing Pigeon", 40, ExerciseKind::Hold, Impact::Low, false, "Hips/Glutes", "Ankle on opposite knee, sit back gently. Hold wall if needed."),
            ex("Chest Opener", 30, ExerciseKind::Flow, Impact::Low, false, "Chest/Shoulders", "Clasp hands behind back, lift gently. Open across the chest."),
            ex("Side Body Stretch", 35, ExerciseKind::Flow, Impact::Low, false, "Obliques", "Reach overhead, lean to each side. Long slow breaths."),
            ex("Closing Breaths", 30, ExerciseKind::Flow, Impact::Low, false, "Core", "In for 4, out for 8. Three rounds. You released something today."),
        ],
    });

    workouts.push(Workout {
        id: "l3".into(),
        title: "Balance & Core".into(),
        subtitle: "Stability work that matches fluctuating energy".into(),
        phase: Phase::Luteal,
        difficulty: 3,
        xp: 26,
        warmup_note: Some("Gentle marching in place and ankle circles to prep balance.".into()),
        unlock: Some(UnlockRequirement { phase: Phase::Luteal, workouts_needed: 2 }),
        exercises: vec![
            ex("Marching in Place", 30, ExerciseKind::Cardio, Impact::Low, false, "Full Body", "Lift knees with control. Arms swinging naturally."),
            ex("Single Leg Stand", 35, ExerciseKind::Hold, Impact::Low, false, "Ankles/Core", "One foot up, hold steady. Focus on a point ahead. Switch halfway."),
            ex("Dead Bug", 40, ExerciseKind::Strength, Impact::Low, true, "Core", "On your back, opposite arm and leg extend. Core stays flat to floor."),
            rest("Rest", 20, "Balance work is harder than it looks. Rest is smart."),
            ex("Bird Dog", 40, ExerciseKind::Strength, Impact::Low, true, "Core/Back", "All fours, extend opposite arm and leg. Hold 3 seconds each side."),
            ex("Side Plank", 30, ExerciseKind::Hold, Impact::Low, true, "Obliques", "Forearm down, stack feet or stagger. Hold each side 15 seconds."),
            rest("Rest", 20, "You're building invisible strength. It counts."),
            ex("Heel-to-Toe Walk", 30, ExerciseKind::Flow, Impact::Low, false, "Balance", "Walk in a straight line, heel touching toe. Arms out for balance."),
            ex("Standing Bicycle", 35, ExerciseKind::Strength, Impact::Low, false, "Core/Obliques", "Elbow to opposite knee, standing. Controlled, not fast."),
            ex("Final Stretch", 40, ExerciseKind::Flow, Impact::Low, false, "Full Body", "Whatever your body asks for. Stability is a quiet kind of strength."),
        ],
    });

    Catalog {
        workouts,
        substitutions: build_substitutions(),
    }
}

impl Catalog {
    /// Look up a workout by id
    pub fn workout(&self, id: &str) -> Option<&Workout> {
        self.workouts.iter().find(|w| w.id == id)
    }

    /// Workouts for a phase, in catalog order
    pub fn workouts_for(&self, phase: Phase) -> impl Iterator<Item = &Workout> {
        self.workouts.iter().filter(move |w| w.phase == phase)
    }

    /// Validate the catalog for consistency and completeness
    ///
    /// Returns a list of validation errors, or empty Vec if valid.
    /// A workout with no exercises is reported but is not fatal for the
    /// session state machine, which treats it as an empty session.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        let mut seen = HashSet::new();

        for workout in &self.workouts {
            let id = &workout.id;
            if id.is_empty() {
                errors.push("Workout has empty ID".to_string());
            }
            if !seen.insert(id.as_str()) {
                errors.push(format!("Duplicate workout ID '{}'", id));
            }
            if workout.title.is_empty() {
                errors.push(format!("Workout '{}' has empty title", id));
            }
            if workout.exercises.is_empty() {
                errors.push(format!("Workout '{}' has no exercises", id));
            }
            if !(1..=5).contains(&workout.difficulty) {
                errors.push(format!(
                    "Workout '{}': difficulty {} outside 1-5",
                    id, workout.difficulty
                ));
            }
            if let Some(req) = &workout.unlock {
                if req.workouts_needed == 0 {
                    errors.push(format!(
                        "Workout '{}': unlock requirement needs zero workouts",
                        id
                    ));
                }
            }

            for exercise in &workout.exercises {
                if exercise.name.is_empty() {
                    errors.push(format!("Workout '{}' has an unnamed exercise", id));
                }
                if exercise.duration_seconds == 0 {
                    errors.push(format!(
                        "Workout '{}': exercise '{}' has zero duration",
                        id, exercise.name
                    ));
                }
            }
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_loads() {
        let catalog = build_default_catalog();
        assert_eq!(catalog.workouts.len(), 12);
    }

    #[test]
    fn test_default_catalog_validates() {
        let catalog = build_default_catalog();
        let errors = catalog.validate();
        assert!(errors.is_empty(), "Catalog errors: {:?}", errors);
    }

    #[test]
    fn test_every_phase_has_workouts() {
        let catalog = get_default_catalog();
        for phase in Phase::ALL {
            assert_eq!(catalog.workouts_for(phase).count(), 3, "{:?}", phase);
        }
    }

    #[test]
    fn test_workout_lookup() {
        let catalog = get_default_catalog();
        let workout = catalog.workout("f1").unwrap();
        assert_eq!(workout.title, "Foundation Build");
        assert_eq!(workout.xp, 32);
        assert!(catalog.workout("nope").is_none());
    }

    #[test]
    fn test_every_workout_has_a_scoring_exercise() {
        let catalog = get_default_catalog();
        for workout in &catalog.workouts {
            assert!(
                workout.exercises.iter().any(|e| !e.is_rest()),
                "{} has only rest",
                workout.id
            );
        }
    }

    #[test]
    fn test_rest_is_never_a_substitution_key() {
        let catalog = get_default_catalog();
        assert!(!catalog.substitutions.low_impact.contains_key("Rest"));
        assert!(!catalog.substitutions.standing.contains_key("Rest"));
    }

    #[test]
    fn test_validate_reports_problems() {
        let mut catalog = build_default_catalog();
        let mut dup = catalog.workouts[0].clone();
        dup.exercises.clear();
        catalog.workouts.push(dup);

        let errors = catalog.validate();
        assert!(errors.iter().any(|e| e.contains("Duplicate")));
        assert!(errors.iter().any(|e| e.contains("no exercises")));
    }
}
